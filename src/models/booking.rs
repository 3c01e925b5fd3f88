use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A booking as returned by the backend. The status arrives as a free-form
/// string ("PENDING", "Active", ...) and is classified case-insensitively
/// through [`Booking::status_kind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub operator_id: Option<i64>,
    #[serde(default)]
    pub machine_id: Option<i64>,
    #[serde(default)]
    pub machine_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
    Unknown,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => BookingStatus::Pending,
            "accepted" | "confirmed" => BookingStatus::Accepted,
            "in_progress" | "active" => BookingStatus::InProgress,
            "completed" | "complete" => BookingStatus::Completed,
            "cancelled" | "canceled" => BookingStatus::Cancelled,
            _ => BookingStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Accepted => "Accepted",
            BookingStatus::InProgress => "In progress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Unknown => "Unknown",
        }
    }

    /// Completed and cancelled bookings never change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

const WIRE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_wire_datetime(s: &str) -> Option<NaiveDateTime> {
    WIRE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

impl Booking {
    pub fn status_kind(&self) -> BookingStatus {
        BookingStatus::parse(&self.status)
    }

    /// Parsed start/end window, when both timestamps are present and valid.
    pub fn time_window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = parse_wire_datetime(self.start_time.as_deref()?)?;
        let end = parse_wire_datetime(self.end_time.as_deref()?)?;
        Some((start, end))
    }
}
