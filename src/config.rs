use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub geocode_base_url: String,
    pub upload_base_url: String,
    pub session_db: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub fast_poll_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("RIGBOOK_API_URL")
                .unwrap_or_else(|_| "https://api.rigbook.app/api/".to_string()),
            geocode_base_url: env::var("RIGBOOK_GEOCODE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org/".to_string()),
            upload_base_url: env::var("RIGBOOK_UPLOAD_URL")
                .unwrap_or_else(|_| "https://api.rigbook.app/uploads/".to_string()),
            session_db: env::var("RIGBOOK_SESSION_DB").unwrap_or_else(|_| "rigbook.db".to_string()),
            request_timeout: duration_from_env("RIGBOOK_HTTP_TIMEOUT_SECS", 30),
            poll_interval: duration_from_env("RIGBOOK_POLL_SECS", 10),
            fast_poll_interval: duration_from_env("RIGBOOK_FAST_POLL_SECS", 5),
        }
    }
}

fn duration_from_env(key: &str, default_secs: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(default_secs))
}
