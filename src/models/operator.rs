use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_bookings: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorStatus {
    Available,
    Busy,
    Offline,
}

impl OperatorStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => OperatorStatus::Available,
            "busy" => OperatorStatus::Busy,
            _ => OperatorStatus::Offline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorStatus::Available => "available",
            OperatorStatus::Busy => "busy",
            OperatorStatus::Offline => "offline",
        }
    }
}

impl Operator {
    pub fn status_kind(&self) -> OperatorStatus {
        self.status
            .as_deref()
            .map(OperatorStatus::parse)
            .unwrap_or(OperatorStatus::Offline)
    }
}
