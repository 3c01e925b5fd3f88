use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use rigbook::api::rest::RestClient;
use rigbook::api::BackendApi;
use rigbook::config::AppConfig;
use rigbook::db;
use rigbook::models::Role;
use rigbook::realtime::{RealTimeUpdates, Topic, Update};
use rigbook::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.session_db)?;
    let sessions = SessionStore::new(conn);

    let Some(session) = sessions.current()? else {
        tracing::warn!("no stored session; log in from the app first");
        return Ok(());
    };
    tracing::info!(role = session.role.as_str(), name = %session.name, "session loaded");

    let api: Arc<dyn BackendApi> = Arc::new(RestClient::new(&config)?);
    let updates = RealTimeUpdates::new(
        api,
        sessions.clone(),
        config.poll_interval,
        config.fast_poll_interval,
    );

    let mut subscriptions = Vec::new();
    subscriptions.push(updates.subscribe(Topic::Dashboard, |update| {
        if let Update::Dashboard(stats) = update {
            tracing::info!(
                total = stats.total_bookings,
                pending = stats.pending_bookings,
                completed = stats.completed_bookings,
                "dashboard refreshed"
            );
        }
    }));

    match session.role {
        Role::Operator => {
            subscriptions.push(updates.subscribe(Topic::PendingBookings, |update| {
                if let Update::PendingBookings(bookings) = update {
                    tracing::info!(count = bookings.len(), "pending bookings refreshed");
                }
            }));
            subscriptions.push(updates.subscribe(Topic::Earnings, |update| {
                if let Update::Earnings(earnings) = update {
                    tracing::info!(total = ?earnings.total, "earnings refreshed");
                }
            }));
        }
        Role::User | Role::Admin => {
            subscriptions.push(updates.subscribe(Topic::UserBookings, |update| {
                if let Update::UserBookings(bookings) = update {
                    tracing::info!(count = bookings.len(), "bookings refreshed");
                }
            }));
        }
    }

    updates.start_polling();
    updates.refresh_now();
    tracing::info!("polling started, ctrl-c to stop");

    tokio::signal::ctrl_c().await?;

    updates.stop_polling();
    drop(subscriptions);
    Ok(())
}
