//! Polling-based update service. Screens subscribe to the topics they render;
//! while polling is active every tick re-fetches each subscribed topic and
//! fans the results out to the subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::BackendApi;
use crate::errors::AppError;
use crate::models::{Booking, DashboardStats, EarningsSummary, Role, Session};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Dashboard,
    PendingBookings,
    Earnings,
    BookingStatus,
    UserBookings,
    OperatorBookings,
}

impl Topic {
    const ALL: [Topic; 6] = [
        Topic::Dashboard,
        Topic::PendingBookings,
        Topic::Earnings,
        Topic::BookingStatus,
        Topic::UserBookings,
        Topic::OperatorBookings,
    ];

    fn index(self) -> usize {
        match self {
            Topic::Dashboard => 0,
            Topic::PendingBookings => 1,
            Topic::Earnings => 2,
            Topic::BookingStatus => 3,
            Topic::UserBookings => 4,
            Topic::OperatorBookings => 5,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Update {
    Dashboard(DashboardStats),
    PendingBookings(Vec<Booking>),
    Earnings(EarningsSummary),
    BookingStatus(Booking),
    UserBookings(Vec<Booking>),
    OperatorBookings(Vec<Booking>),
}

type Callback = dyn Fn(Update) + Send + Sync;

struct Entry {
    id: u64,
    callback: Arc<Callback>,
}

struct Inner {
    api: Arc<dyn BackendApi>,
    sessions: SessionStore,
    listeners: Mutex<HashMap<Topic, Vec<Entry>>>,
    next_sub_id: AtomicU64,
    // Newest issued request per topic; a completion whose sequence no longer
    // matches is stale and dropped before dispatch.
    seq: [AtomicU64; 6],
    watched_booking: Mutex<Option<i64>>,
    interval: watch::Sender<Duration>,
    normal_interval: Duration,
    fast_interval: Duration,
}

/// Handle returned by [`RealTimeUpdates::subscribe`]; dropping it (or calling
/// [`Subscription::unsubscribe`]) removes the listener. In-flight requests
/// are not cancelled — their delivery just no longer reaches this listener.
pub struct Subscription {
    inner: Weak<Inner>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut listeners = inner.listeners.lock().unwrap();
            if let Some(entries) = listeners.get_mut(&self.topic) {
                entries.retain(|e| e.id != self.id);
            }
        }
    }
}

pub struct RealTimeUpdates {
    inner: Arc<Inner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RealTimeUpdates {
    pub fn new(
        api: Arc<dyn BackendApi>,
        sessions: SessionStore,
        normal_interval: Duration,
        fast_interval: Duration,
    ) -> Self {
        let (interval, _) = watch::channel(normal_interval);
        Self {
            inner: Arc::new(Inner {
                api,
                sessions,
                listeners: Mutex::new(HashMap::new()),
                next_sub_id: AtomicU64::new(1),
                seq: std::array::from_fn(|_| AtomicU64::new(0)),
                watched_booking: Mutex::new(None),
                interval,
                normal_interval,
                fast_interval,
            }),
            task: Mutex::new(None),
        }
    }

    pub fn subscribe(
        &self,
        topic: Topic,
        callback: impl Fn(Update) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_sub_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap()
            .entry(topic)
            .or_default()
            .push(Entry {
                id,
                callback: Arc::new(callback),
            });
        Subscription {
            inner: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Selects the booking the `BookingStatus` topic tracks.
    pub fn watch_booking(&self, booking_id: i64) {
        *self.inner.watched_booking.lock().unwrap() = Some(booking_id);
    }

    pub fn clear_watched_booking(&self) {
        *self.inner.watched_booking.lock().unwrap() = None;
    }

    /// Starts the poll loop at the normal cadence. No-op when already
    /// running; the first tick fires one interval from now.
    pub fn start_polling(&self) {
        let mut task = self.task.lock().unwrap();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        // send_replace: the value must stick even while no loop is
        // subscribed yet.
        self.inner.interval.send_replace(self.inner.normal_interval);
        tracing::debug!(interval = ?self.inner.normal_interval, "polling started");
        *task = Some(tokio::spawn(run_loop(Arc::clone(&self.inner))));
    }

    /// Switches to the fast cadence, starting the loop if it is stopped.
    pub fn start_fast_polling(&self) {
        self.inner.interval.send_replace(self.inner.fast_interval);
        let mut task = self.task.lock().unwrap();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        tracing::debug!(interval = ?self.inner.fast_interval, "fast polling started");
        *task = Some(tokio::spawn(run_loop(Arc::clone(&self.inner))));
    }

    /// Cancels the scheduled loop; no further ticks fire. Requests already
    /// in flight are left to finish and go through the usual staleness and
    /// subscriber checks on completion.
    pub fn stop_polling(&self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
            tracing::debug!("polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.task
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Fires one round of requests immediately, bypassing the timer.
    pub fn refresh_now(&self) {
        poll_round(&self.inner);
    }
}

impl Drop for RealTimeUpdates {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

async fn run_loop(inner: Arc<Inner>) {
    let mut interval_rx = inner.interval.subscribe();
    loop {
        let delay = *interval_rx.borrow();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                poll_round(&inner);
            }
            changed = interval_rx.changed() => {
                // Restart the sleep at the new cadence.
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

/// One round: read the session, then issue one request per subscribed topic.
/// The round returns after dispatching the requests; it never waits for them,
/// so a slow backend cannot stack ticks.
fn poll_round(inner: &Arc<Inner>) {
    let session = match inner.sessions.current() {
        Ok(Some(session)) => session,
        Ok(None) => {
            tracing::debug!("no active session, skipping poll round");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session, skipping poll round");
            return;
        }
    };

    let topics: Vec<Topic> = {
        let listeners = inner.listeners.lock().unwrap();
        Topic::ALL
            .iter()
            .copied()
            .filter(|t| listeners.get(t).is_some_and(|entries| !entries.is_empty()))
            .collect()
    };

    for topic in topics {
        let seq = inner.seq[topic.index()].fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(inner);
        let session = session.clone();
        tokio::spawn(async move {
            match fetch(&inner, topic, &session).await {
                Ok(Some(update)) => {
                    if inner.seq[topic.index()].load(Ordering::SeqCst) != seq {
                        tracing::trace!(?topic, "dropping stale poll response");
                        return;
                    }
                    dispatch(&inner, topic, update);
                }
                Ok(None) => {}
                // Poll failures are logged and dropped; the next tick tries
                // again. No retry, no backoff.
                Err(e) => tracing::warn!(?topic, error = %e, "poll request failed"),
            }
        });
    }
}

async fn fetch(
    inner: &Inner,
    topic: Topic,
    session: &Session,
) -> Result<Option<Update>, AppError> {
    let api = &inner.api;

    // Topics that do not apply to the session's role resolve to None rather
    // than erroring every tick.
    let update = match topic {
        Topic::Dashboard => {
            let stats = match session.role {
                Role::Operator => match session.subject_id() {
                    Some(id) => api.operator_dashboard(id).await?,
                    None => return Ok(None),
                },
                Role::Admin => api.admin_dashboard().await?,
                Role::User => match session.subject_id() {
                    Some(id) => api.user_dashboard(id).await?,
                    None => return Ok(None),
                },
            };
            Some(Update::Dashboard(stats))
        }
        Topic::PendingBookings => match session.operator_id {
            Some(id) => Some(Update::PendingBookings(api.pending_bookings(id).await?)),
            None => None,
        },
        Topic::Earnings => match session.operator_id {
            Some(id) => Some(Update::Earnings(api.earnings(id).await?)),
            None => None,
        },
        Topic::BookingStatus => {
            let watched = *inner.watched_booking.lock().unwrap();
            match watched {
                Some(id) => Some(Update::BookingStatus(api.booking_status(id).await?)),
                None => None,
            }
        }
        Topic::UserBookings => match session.user_id {
            Some(id) => Some(Update::UserBookings(api.user_bookings(id).await?)),
            None => None,
        },
        Topic::OperatorBookings => match session.operator_id {
            Some(id) => Some(Update::OperatorBookings(api.operator_bookings(id).await?)),
            None => None,
        },
    };

    Ok(update)
}

fn dispatch(inner: &Inner, topic: Topic, update: Update) {
    // Snapshot the callbacks so listeners are invoked outside the lock.
    let callbacks: Vec<Arc<Callback>> = {
        let listeners = inner.listeners.lock().unwrap();
        listeners
            .get(&topic)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.callback)).collect())
            .unwrap_or_default()
    };

    for callback in callbacks {
        callback(update.clone());
    }
}
