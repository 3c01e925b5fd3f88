use std::sync::RwLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{
    Booking, DashboardStats, EarningsSummary, Envelope, Machine, Operator, OperatorStatus, Role,
    Session, User,
};

use super::raw::{CallOutcome, RawClient};
use super::{BackendApi, CreateBookingRequest, LoginRequest, RegisterRequest};

/// Typed client over the raw executor. Every endpoint goes through the same
/// transport; this layer only builds paths and decodes envelopes.
pub struct RestClient {
    raw: RawClient,
    token: RwLock<Option<String>>,
}

impl RestClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            raw: RawClient::new(&config.api_base_url, config.request_timeout)?,
            token: RwLock::new(None),
        })
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap() = token;
    }

    fn bearer(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        decode_data(self.raw.get(path, self.bearer().as_deref()).await)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AppError> {
        decode_list(self.raw.get(path, self.bearer().as_deref()).await)
    }

    async fn post_data<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let body = encode_body(path, body)?;
        decode_data(self.raw.post(path, &body, self.bearer().as_deref()).await)
    }

    async fn post_ack<B: Serialize>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let body = encode_body(path, body)?;
        decode_envelope::<serde_json::Value>(
            self.raw.post(path, &body, self.bearer().as_deref()).await,
        )
        .map(|_| ())
    }
}

fn encode_body<B: Serialize>(path: &str, body: &B) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(body)
        .map_err(|e| AppError::Decode(format!("failed to encode request for {path}: {e}")))
}

fn failure_error(outcome: &CallOutcome) -> AppError {
    match outcome.status {
        Some(status) => AppError::Api {
            status,
            message: outcome
                .error_message
                .clone()
                .unwrap_or_else(|| format!("HTTP {status}")),
        },
        None => AppError::Transport(
            outcome
                .error_message
                .clone()
                .unwrap_or_else(|| "request failed".to_string()),
        ),
    }
}

fn decode_envelope<T: DeserializeOwned>(outcome: CallOutcome) -> Result<Envelope<T>, AppError> {
    if !outcome.ok {
        return Err(failure_error(&outcome));
    }
    let json = outcome
        .json
        .ok_or_else(|| AppError::Decode(format!("empty response body from {}", outcome.url)))?;
    serde_json::from_value(json)
        .map_err(|e| AppError::Decode(format!("bad response from {}: {e}", outcome.url)))
}

fn decode_data<T: DeserializeOwned>(outcome: CallOutcome) -> Result<T, AppError> {
    let url = outcome.url.clone();
    decode_envelope::<T>(outcome)?
        .into_data()
        .ok_or_else(|| AppError::Decode(format!("missing data field in response from {url}")))
}

fn decode_list<T: DeserializeOwned>(outcome: CallOutcome) -> Result<Vec<T>, AppError> {
    Ok(decode_envelope::<T>(outcome)?.into_list())
}

/// Shape of the auth payload; id fields vary by role and backend version.
#[derive(Debug, Deserialize)]
struct AuthPayload {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    operator_id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

impl AuthPayload {
    fn into_session(self) -> Session {
        let role = Role::parse(self.role.as_deref().unwrap_or("user"));
        let (user_id, operator_id) = match role {
            Role::Operator => (None, self.operator_id.or(self.id)),
            Role::User | Role::Admin => (self.user_id.or(self.id), None),
        };
        Session {
            role,
            user_id,
            operator_id,
            name: self.name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl BackendApi for RestClient {
    async fn login(&self, req: &LoginRequest) -> Result<Session, AppError> {
        let payload: AuthPayload = self.post_data("auth/login", req).await?;
        if payload.token.is_some() {
            self.set_token(payload.token.clone());
        }
        Ok(payload.into_session())
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Session, AppError> {
        let payload: AuthPayload = self.post_data("auth/register", req).await?;
        if payload.token.is_some() {
            self.set_token(payload.token.clone());
        }
        Ok(payload.into_session())
    }

    async fn user_dashboard(&self, user_id: i64) -> Result<DashboardStats, AppError> {
        self.get_data(&format!("user/dashboard?user_id={user_id}")).await
    }

    async fn user_profile(&self, user_id: i64) -> Result<User, AppError> {
        self.get_data(&format!("user/profile?user_id={user_id}")).await
    }

    async fn user_bookings(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        self.get_list(&format!("user/bookings?user_id={user_id}")).await
    }

    async fn create_booking(&self, req: &CreateBookingRequest) -> Result<Booking, AppError> {
        self.post_data("user/create_booking", req).await
    }

    async fn operator_dashboard(&self, operator_id: i64) -> Result<DashboardStats, AppError> {
        self.get_data(&format!("operator/dashboard?operator_id={operator_id}"))
            .await
    }

    async fn operator_profile(&self, operator_id: i64) -> Result<Operator, AppError> {
        self.get_data(&format!("operator/profile?operator_id={operator_id}"))
            .await
    }

    async fn pending_bookings(&self, operator_id: i64) -> Result<Vec<Booking>, AppError> {
        self.get_list(&format!("operator/pending_bookings?operator_id={operator_id}"))
            .await
    }

    async fn operator_bookings(&self, operator_id: i64) -> Result<Vec<Booking>, AppError> {
        self.get_list(&format!("operator/bookings?operator_id={operator_id}"))
            .await
    }

    async fn earnings(&self, operator_id: i64) -> Result<EarningsSummary, AppError> {
        self.get_data(&format!("operator/earnings?operator_id={operator_id}"))
            .await
    }

    async fn accept_booking(&self, operator_id: i64, booking_id: i64) -> Result<(), AppError> {
        self.post_ack(
            "operator/accept_booking",
            &json!({"operator_id": operator_id, "booking_id": booking_id}),
        )
        .await
    }

    async fn decline_booking(&self, operator_id: i64, booking_id: i64) -> Result<(), AppError> {
        self.post_ack(
            "operator/decline_booking",
            &json!({"operator_id": operator_id, "booking_id": booking_id}),
        )
        .await
    }

    async fn complete_booking(&self, operator_id: i64, booking_id: i64) -> Result<(), AppError> {
        self.post_ack(
            "operator/complete_booking",
            &json!({"operator_id": operator_id, "booking_id": booking_id}),
        )
        .await
    }

    async fn update_operator_status(
        &self,
        operator_id: i64,
        status: OperatorStatus,
    ) -> Result<(), AppError> {
        self.post_ack(
            "operator/update_status",
            &json!({"operator_id": operator_id, "status": status.as_str()}),
        )
        .await
    }

    async fn admin_dashboard(&self) -> Result<DashboardStats, AppError> {
        self.get_data("admin/dashboard").await
    }

    async fn booking_status(&self, booking_id: i64) -> Result<Booking, AppError> {
        self.get_data(&format!("booking/status?booking_id={booking_id}"))
            .await
    }

    async fn cancel_booking(&self, booking_id: i64) -> Result<(), AppError> {
        self.post_ack("booking/cancel", &json!({"booking_id": booking_id}))
            .await
    }

    async fn machines(&self, category: Option<&str>) -> Result<Vec<Machine>, AppError> {
        let path = match category {
            Some(category) => format!("machines/list?category={category}"),
            None => "machines/list".to_string(),
        };
        self.get_list(&path).await
    }

    async fn machine(&self, machine_id: i64) -> Result<Machine, AppError> {
        self.get_data(&format!("machines/detail?machine_id={machine_id}"))
            .await
    }
}
