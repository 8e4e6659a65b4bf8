//! Payment domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Payment aggregate entity
//! - `status` - PaymentStatus state machine
//! - `statistics` - Trailing-window statistics
//! - `errors` - PaymentError taxonomy

mod aggregate;
mod errors;
mod statistics;
mod status;

pub use aggregate::{minor_to_major, Payment, StatusChange, MINOR_UNITS_PER_MAJOR};
pub use errors::PaymentError;
pub use statistics::{PaymentStatistics, StatisticsWindows};
pub use status::PaymentStatus;
