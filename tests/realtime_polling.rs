use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use rigbook::api::{BackendApi, CreateBookingRequest, LoginRequest, RegisterRequest};
use rigbook::db;
use rigbook::errors::AppError;
use rigbook::models::{
    Booking, DashboardStats, EarningsSummary, Machine, Operator, OperatorStatus, Role, Session,
    User,
};
use rigbook::realtime::{RealTimeUpdates, Topic, Update};
use rigbook::session::SessionStore;

const NORMAL: Duration = Duration::from_secs(10);
const FAST: Duration = Duration::from_secs(5);

// ── Mock backend ──

#[derive(Default)]
struct MockApi {
    user_dashboard_calls: AtomicUsize,
    operator_dashboard_calls: AtomicUsize,
    user_bookings_calls: AtomicUsize,
    pending_bookings_calls: AtomicUsize,
    earnings_calls: AtomicUsize,
    booking_status_calls: AtomicUsize,
}

fn sample_booking(status: &str) -> Booking {
    Booking {
        id: 77,
        user_id: Some(42),
        operator_id: Some(9),
        machine_id: Some(7),
        machine_name: Some("JCB 3DX".to_string()),
        start_time: Some("2025-07-01 08:00:00".to_string()),
        end_time: Some("2025-07-01 16:00:00".to_string()),
        status: status.to_string(),
        amount: Some(12000.0),
        location: Some("Pune".to_string()),
        latitude: None,
        longitude: None,
    }
}

#[async_trait]
impl BackendApi for MockApi {
    async fn login(&self, _req: &LoginRequest) -> Result<Session, AppError> {
        Err(AppError::Transport("not wired in mock".to_string()))
    }

    async fn register(&self, _req: &RegisterRequest) -> Result<Session, AppError> {
        Err(AppError::Transport("not wired in mock".to_string()))
    }

    async fn user_dashboard(&self, _user_id: i64) -> Result<DashboardStats, AppError> {
        self.user_dashboard_calls.fetch_add(1, Ordering::SeqCst);
        Ok(DashboardStats::default())
    }

    async fn user_profile(&self, user_id: i64) -> Result<User, AppError> {
        Ok(User {
            id: user_id,
            name: Some("Asha".to_string()),
            phone: None,
            email: None,
        })
    }

    async fn user_bookings(&self, _user_id: i64) -> Result<Vec<Booking>, AppError> {
        self.user_bookings_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![sample_booking("pending")])
    }

    async fn create_booking(&self, _req: &CreateBookingRequest) -> Result<Booking, AppError> {
        Ok(sample_booking("pending"))
    }

    async fn operator_dashboard(&self, _operator_id: i64) -> Result<DashboardStats, AppError> {
        self.operator_dashboard_calls.fetch_add(1, Ordering::SeqCst);
        Ok(DashboardStats::default())
    }

    async fn operator_profile(&self, operator_id: i64) -> Result<Operator, AppError> {
        Ok(Operator {
            id: operator_id,
            name: Some("Ravi".to_string()),
            phone: None,
            email: None,
            status: Some("available".to_string()),
            rating: Some(4.6),
            total_bookings: Some(120),
        })
    }

    async fn pending_bookings(&self, _operator_id: i64) -> Result<Vec<Booking>, AppError> {
        self.pending_bookings_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![sample_booking("pending")])
    }

    async fn operator_bookings(&self, _operator_id: i64) -> Result<Vec<Booking>, AppError> {
        Ok(vec![sample_booking("active")])
    }

    async fn earnings(&self, _operator_id: i64) -> Result<EarningsSummary, AppError> {
        self.earnings_calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Transport("mock earnings endpoint down".to_string()))
    }

    async fn accept_booking(&self, _operator_id: i64, _booking_id: i64) -> Result<(), AppError> {
        Ok(())
    }

    async fn decline_booking(&self, _operator_id: i64, _booking_id: i64) -> Result<(), AppError> {
        Ok(())
    }

    async fn complete_booking(&self, _operator_id: i64, _booking_id: i64) -> Result<(), AppError> {
        Ok(())
    }

    async fn update_operator_status(
        &self,
        _operator_id: i64,
        _status: OperatorStatus,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn admin_dashboard(&self) -> Result<DashboardStats, AppError> {
        Ok(DashboardStats::default())
    }

    async fn booking_status(&self, booking_id: i64) -> Result<Booking, AppError> {
        self.booking_status_calls.fetch_add(1, Ordering::SeqCst);
        let mut booking = sample_booking("active");
        booking.id = booking_id;
        Ok(booking)
    }

    async fn cancel_booking(&self, _booking_id: i64) -> Result<(), AppError> {
        Ok(())
    }

    async fn machines(&self, _category: Option<&str>) -> Result<Vec<Machine>, AppError> {
        Ok(vec![])
    }

    async fn machine(&self, _machine_id: i64) -> Result<Machine, AppError> {
        Err(AppError::Transport("not wired in mock".to_string()))
    }
}

// ── Helpers ──

fn user_session() -> Session {
    Session {
        role: Role::User,
        user_id: Some(42),
        operator_id: None,
        name: "Asha".to_string(),
        phone: "+919812345678".to_string(),
        email: "asha@example.com".to_string(),
    }
}

fn operator_session() -> Session {
    Session {
        role: Role::Operator,
        user_id: None,
        operator_id: Some(9),
        name: "Ravi".to_string(),
        phone: "+911234567890".to_string(),
        email: "ravi@example.com".to_string(),
    }
}

fn store_with(session: Option<&Session>) -> SessionStore {
    let store = SessionStore::new(db::init_db(":memory:").unwrap());
    if let Some(session) = session {
        store.store_login(session).unwrap();
    }
    store
}

fn manager(api: &Arc<MockApi>, session: Option<&Session>) -> RealTimeUpdates {
    let api: Arc<dyn BackendApi> = (*api).clone();
    RealTimeUpdates::new(api, store_with(session), NORMAL, FAST)
}

/// Let spawned fetch tasks run to completion on the paused runtime.
async fn settle() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}

/// Cross one timer boundary and drain the round it triggers.
async fn tick(duration: Duration) {
    settle().await;
    tokio::time::advance(duration).await;
    settle().await;
}

fn collector() -> (Arc<Mutex<Vec<Update>>>, impl Fn(Update) + Send + Sync) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    (received, move |update| sink.lock().unwrap().push(update))
}

// ── Tests ──

#[tokio::test(start_paused = true)]
async fn tick_fetches_subscribed_topic_and_notifies() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (received, on_update) = collector();
    let _sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.start_polling();
    tick(NORMAL).await;

    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);
    let received = received.lock().unwrap();
    match received.as_slice() {
        [Update::UserBookings(bookings)] => assert_eq!(bookings.len(), 1),
        other => panic!("unexpected updates: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn start_polling_twice_keeps_one_timer() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (_received, on_update) = collector();
    let _sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.start_polling();
    updates.start_polling();
    tick(NORMAL).await;

    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_polling_prevents_further_requests() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (_received, on_update) = collector();
    let _sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.start_polling();
    tick(NORMAL).await;
    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);

    updates.stop_polling();
    assert!(!updates.is_polling());

    for _ in 0..5 {
        tick(NORMAL).await;
    }
    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn fast_polling_starts_the_loop_at_the_fast_cadence() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (_received, on_update) = collector();
    let _sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.start_fast_polling();
    assert!(updates.is_polling());
    tick(FAST).await;

    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn switching_to_fast_reschedules_the_next_tick() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (_received, on_update) = collector();
    let _sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.start_polling();
    settle().await;
    updates.start_fast_polling();
    tick(FAST).await;

    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn no_session_means_no_requests() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, None);

    let (received, on_update) = collector();
    let _sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.start_polling();
    tick(NORMAL).await;

    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 0);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unsubscribed_listener_stops_receiving() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (first, on_first) = collector();
    let (second, on_second) = collector();
    let first_sub = updates.subscribe(Topic::UserBookings, on_first);
    let _second_sub = updates.subscribe(Topic::UserBookings, on_second);

    updates.start_polling();
    tick(NORMAL).await;
    assert_eq!(first.lock().unwrap().len(), 1);
    assert_eq!(second.lock().unwrap().len(), 1);

    first_sub.unsubscribe();
    tick(NORMAL).await;
    assert_eq!(first.lock().unwrap().len(), 1);
    assert_eq!(second.lock().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn topic_without_subscribers_is_not_fetched() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (_received, on_update) = collector();
    let sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.start_polling();
    tick(NORMAL).await;
    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);

    drop(sub);
    tick(NORMAL).await;
    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn refresh_now_fires_without_the_timer() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (received, on_update) = collector();
    let _sub = updates.subscribe(Topic::UserBookings, on_update);

    updates.refresh_now();
    settle().await;

    assert_eq!(api.user_bookings_calls.load(Ordering::SeqCst), 1);
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dashboard_request_follows_session_role() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&operator_session()));

    let (_received, on_update) = collector();
    let _sub = updates.subscribe(Topic::Dashboard, on_update);

    updates.start_polling();
    tick(NORMAL).await;

    assert_eq!(api.operator_dashboard_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.user_dashboard_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn poll_failure_is_swallowed_and_other_topics_still_deliver() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&operator_session()));

    let (earnings_updates, on_earnings) = collector();
    let (pending_updates, on_pending) = collector();
    let _earnings_sub = updates.subscribe(Topic::Earnings, on_earnings);
    let _pending_sub = updates.subscribe(Topic::PendingBookings, on_pending);

    updates.start_polling();
    tick(NORMAL).await;

    // The earnings endpoint failed; the pending-bookings listener is
    // unaffected and the failure never reaches an observer.
    assert_eq!(api.earnings_calls.load(Ordering::SeqCst), 1);
    assert!(earnings_updates.lock().unwrap().is_empty());
    assert_eq!(pending_updates.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn booking_status_polls_only_the_watched_booking() {
    let api = Arc::new(MockApi::default());
    let updates = manager(&api, Some(&user_session()));

    let (received, on_update) = collector();
    let _sub = updates.subscribe(Topic::BookingStatus, on_update);

    updates.start_polling();
    tick(NORMAL).await;
    assert_eq!(api.booking_status_calls.load(Ordering::SeqCst), 0);

    updates.watch_booking(77);
    tick(NORMAL).await;
    assert_eq!(api.booking_status_calls.load(Ordering::SeqCst), 1);
    match received.lock().unwrap().as_slice() {
        [Update::BookingStatus(booking)] => assert_eq!(booking.id, 77),
        other => panic!("unexpected updates: {other:?}"),
    }

    updates.clear_watched_booking();
    tick(NORMAL).await;
    assert_eq!(api.booking_status_calls.load(Ordering::SeqCst), 1);
}
