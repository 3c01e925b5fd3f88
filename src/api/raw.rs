use std::time::Duration;

use reqwest::header::CONNECTION;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::errors::AppError;

/// Uniform record for one backend call. Transport failures are folded into
/// `ok = false` with a synthetic message rather than surfaced as `Err`;
/// callers branch on the record.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub ok: bool,
    pub status: Option<u16>,
    pub json: Option<Value>,
    pub error_message: Option<String>,
    pub url: String,
}

/// Low-level request executor: explicit timeout, optional bearer token, and
/// a single retry on a fresh connection when a pooled one dies mid-request.
pub struct RawClient {
    base_url: Url,
    client: Client,
    // Pool-less client used only for that retry; Connection: close is set
    // per-request as well.
    retry_client: Client,
}

impl RawClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid api base url: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {e}")))?;
        let retry_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            retry_client,
        })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> CallOutcome {
        self.execute(Method::GET, path, None, token).await
    }

    pub async fn post(&self, path: &str, body: &Value, token: Option<&str>) -> CallOutcome {
        self.execute(Method::POST, path, Some(body), token).await
    }

    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> CallOutcome {
        let url = match self.base_url.join(path) {
            Ok(url) => url,
            Err(e) => {
                return CallOutcome {
                    ok: false,
                    status: None,
                    json: None,
                    error_message: Some(format!("invalid request path: {e}")),
                    url: path.to_string(),
                }
            }
        };

        let sent = match self
            .send(&self.client, method.clone(), url.clone(), body, token, false)
            .await
        {
            Err(e) if is_stale_connection(&e) => {
                // A pooled connection was closed under us while the request
                // was being written. Retry exactly once without keep-alive;
                // a second failure is surfaced as-is.
                tracing::warn!(url = %url, error = %e, "connection dropped mid-request, retrying without keep-alive");
                self.send(&self.retry_client, method, url.clone(), body, token, true)
                    .await
            }
            other => other,
        };

        match sent {
            Ok(response) => outcome_from_response(response).await,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "request failed");
                CallOutcome {
                    ok: false,
                    status: None,
                    json: None,
                    error_message: Some(format!("network error: {e}")),
                    url: url.to_string(),
                }
            }
        }
    }

    async fn send(
        &self,
        client: &Client,
        method: Method,
        url: Url,
        body: Option<&Value>,
        token: Option<&str>,
        close: bool,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut req = client.request(method, url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if close {
            req = req.header(CONNECTION, "close");
        }
        req.send().await
    }
}

fn is_stale_connection(e: &reqwest::Error) -> bool {
    e.is_request() && !e.is_timeout() && !e.is_connect()
}

async fn outcome_from_response(response: reqwest::Response) -> CallOutcome {
    let status = response.status();
    let url = response.url().to_string();
    let raw = response.text().await.unwrap_or_default();
    build_outcome(status, &raw, url)
}

fn build_outcome(status: StatusCode, raw: &str, url: String) -> CallOutcome {
    let json: Option<Value> = serde_json::from_str(raw).ok();
    let ok = status.is_success() && body_flag_ok(json.as_ref());
    let error_message = if ok {
        None
    } else {
        Some(extract_error_message(json.as_ref(), raw, status))
    };

    CallOutcome {
        ok,
        status: Some(status.as_u16()),
        json,
        error_message,
        url,
    }
}

/// A 2xx that carries an explicit `ok`/`success` flag still fails when the
/// flag is not true; a body without either flag passes on status alone.
fn body_flag_ok(json: Option<&Value>) -> bool {
    let Some(json) = json else { return true };
    match json.get("ok").or_else(|| json.get("success")) {
        Some(flag) => flag.as_bool().unwrap_or(false),
        None => true,
    }
}

fn extract_error_message(json: Option<&Value>, raw: &str, status: StatusCode) -> String {
    if let Some(json) = json {
        if let Some(msg) = json.get("error").and_then(Value::as_str) {
            return msg.to_string();
        }
        if let Some(msg) = json.get("message").and_then(Value::as_str) {
            return msg.to_string();
        }
    }
    if raw.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        raw.trim().to_string()
    }
}
