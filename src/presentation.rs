//! Row-model builders for the list screens: which layout a row uses, which
//! actions it shows, and how statuses map to badge colors. Pure functions
//! over the DTOs so every screen renders the same rules.

use crate::models::{Booking, BookingStatus, Machine, Operator, OperatorStatus, Role};

pub fn booking_status_color(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Pending => "#F59E0B",
        BookingStatus::Accepted => "#3B82F6",
        BookingStatus::InProgress => "#06B6D4",
        BookingStatus::Completed => "#22C55E",
        BookingStatus::Cancelled => "#EF4444",
        BookingStatus::Unknown => "#9CA3AF",
    }
}

pub fn operator_status_color(status: OperatorStatus) -> &'static str {
    match status {
        OperatorStatus::Available => "#22C55E",
        OperatorStatus::Busy => "#F59E0B",
        OperatorStatus::Offline => "#9CA3AF",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    UserBooking,
    OperatorBooking,
}

#[derive(Debug, Clone)]
pub struct BookingRow {
    pub layout: RowLayout,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub show_cancel: bool,
    pub show_accept_decline: bool,
    pub show_complete: bool,
    pub amount_label: Option<String>,
}

impl BookingRow {
    pub fn build(booking: &Booking, viewer: Role) -> Self {
        let kind = booking.status_kind();
        let layout = match viewer {
            Role::Operator => RowLayout::OperatorBooking,
            Role::User | Role::Admin => RowLayout::UserBooking,
        };
        let is_operator = viewer == Role::Operator;

        Self {
            layout,
            status_label: kind.label(),
            status_color: booking_status_color(kind),
            // Cancelling only makes sense before work starts.
            show_cancel: matches!(kind, BookingStatus::Pending | BookingStatus::Accepted),
            show_accept_decline: is_operator && kind == BookingStatus::Pending,
            show_complete: is_operator
                && matches!(kind, BookingStatus::Accepted | BookingStatus::InProgress),
            amount_label: booking.amount.map(|a| format!("₹{a:.2}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MachineRow {
    pub title: String,
    pub image_url: Option<String>,
    pub price_label: Option<String>,
    pub available: bool,
}

impl MachineRow {
    pub fn build(machine: &Machine, upload_base: &str) -> Self {
        Self {
            title: machine
                .display_name()
                .unwrap_or("Unknown model")
                .to_string(),
            image_url: machine
                .image_ref()
                .map(|raw| resolve_image_url(upload_base, raw)),
            price_label: machine.price_per_hour.map(|p| format!("₹{p:.2}/hr")),
            available: machine.is_available(),
        }
    }
}

/// Absolute image references pass through; relative ones are joined onto the
/// upload base.
pub fn resolve_image_url(upload_base: &str, raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!(
            "{}/{}",
            upload_base.trim_end_matches('/'),
            raw.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone)]
pub struct OperatorRow {
    pub name: String,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub rating_label: Option<String>,
    pub total_bookings: i64,
}

impl OperatorRow {
    pub fn build(operator: &Operator) -> Self {
        let status = operator.status_kind();
        Self {
            name: operator.name.clone().unwrap_or_default(),
            status_label: status.as_str(),
            status_color: operator_status_color(status),
            rating_label: operator.rating.map(|r| format!("{r:.1}")),
            total_bookings: operator.total_bookings.unwrap_or(0),
        }
    }
}
