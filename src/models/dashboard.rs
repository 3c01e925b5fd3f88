use serde::{Deserialize, Serialize};

/// Aggregate counters shown on the dashboard screens. The same shape serves
/// the user, operator and admin dashboards; fields the backend omits for a
/// given role default to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_bookings: i64,
    #[serde(default)]
    pub pending_bookings: i64,
    #[serde(default)]
    pub completed_bookings: i64,
    #[serde(default)]
    pub cancelled_bookings: i64,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub active_machines: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningsSummary {
    #[serde(default)]
    pub today: Option<f64>,
    #[serde(default)]
    pub this_week: Option<f64>,
    #[serde(default)]
    pub this_month: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}
