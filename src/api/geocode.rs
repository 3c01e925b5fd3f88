use std::time::Duration;

use url::Url;

use crate::errors::AppError;
use crate::models::GeocodePlace;

/// Client for the third-party place search used by the booking location
/// picker.
pub struct GeocodeClient {
    base_url: Url,
    client: reqwest::Client,
}

impl GeocodeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid geocode base url: {e}")))?;
        // The public service rejects requests without an identifying agent.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rigbook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { base_url, client })
    }

    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<GeocodePlace>, AppError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| AppError::Config(format!("invalid geocode url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("addressdetails", "1")
            .append_pair("limit", &limit.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("geocode request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Api {
                status: status.as_u16(),
                message: "geocode service error".to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Decode(format!("bad geocode response: {e}")))
    }
}
