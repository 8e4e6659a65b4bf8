//! HTTP adapters - REST API implementations.

pub mod payments;

pub use payments::{payment_router, PaymentAppState};
