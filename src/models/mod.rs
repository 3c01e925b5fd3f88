pub mod booking;
pub mod dashboard;
pub mod envelope;
pub mod geocode;
pub mod machine;
pub mod operator;
pub mod session;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use dashboard::{DashboardStats, EarningsSummary};
pub use envelope::Envelope;
pub use geocode::GeocodePlace;
pub use machine::Machine;
pub use operator::{Operator, OperatorStatus};
pub use session::{Role, Session};
pub use user::User;
