pub mod geocode;
pub mod raw;
pub mod rest;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{
    Booking, DashboardStats, EarningsSummary, Machine, Operator, OperatorStatus, Session, User,
};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateBookingRequest {
    pub user_id: i64,
    pub machine_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
}

/// Typed interface over the backend REST API, one method per endpoint,
/// grouped the way the backend groups its routes. Implemented by
/// [`rest::RestClient`] and by test doubles.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // auth/*
    async fn login(&self, req: &LoginRequest) -> Result<Session, AppError>;
    async fn register(&self, req: &RegisterRequest) -> Result<Session, AppError>;

    // user/*
    async fn user_dashboard(&self, user_id: i64) -> Result<DashboardStats, AppError>;
    async fn user_profile(&self, user_id: i64) -> Result<User, AppError>;
    async fn user_bookings(&self, user_id: i64) -> Result<Vec<Booking>, AppError>;
    async fn create_booking(&self, req: &CreateBookingRequest) -> Result<Booking, AppError>;

    // operator/*
    async fn operator_dashboard(&self, operator_id: i64) -> Result<DashboardStats, AppError>;
    async fn operator_profile(&self, operator_id: i64) -> Result<Operator, AppError>;
    async fn pending_bookings(&self, operator_id: i64) -> Result<Vec<Booking>, AppError>;
    async fn operator_bookings(&self, operator_id: i64) -> Result<Vec<Booking>, AppError>;
    async fn earnings(&self, operator_id: i64) -> Result<EarningsSummary, AppError>;
    async fn accept_booking(&self, operator_id: i64, booking_id: i64) -> Result<(), AppError>;
    async fn decline_booking(&self, operator_id: i64, booking_id: i64) -> Result<(), AppError>;
    async fn complete_booking(&self, operator_id: i64, booking_id: i64) -> Result<(), AppError>;
    async fn update_operator_status(
        &self,
        operator_id: i64,
        status: OperatorStatus,
    ) -> Result<(), AppError>;

    // admin/*
    async fn admin_dashboard(&self) -> Result<DashboardStats, AppError>;

    // booking/*
    async fn booking_status(&self, booking_id: i64) -> Result<Booking, AppError>;
    async fn cancel_booking(&self, booking_id: i64) -> Result<(), AppError>;

    // machines/*
    async fn machines(&self, category: Option<&str>) -> Result<Vec<Machine>, AppError>;
    async fn machine(&self, machine_id: i64) -> Result<Machine, AppError>;
}
