//! Payment reader port (read side / CQRS queries).
//!
//! Listing and aggregate queries used by the customer and admin views.
//! Aggregates return raw values; turning a missing sum into zero is the
//! caller's job.

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::payment::Payment;
use async_trait::async_trait;

/// Which payments a listing should include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentFilter {
    /// Every payment.
    All,
    /// Payments belonging to one customer.
    Customer(String),
}

/// Reader port for payment queries.
#[async_trait]
pub trait PaymentReader: Send + Sync {
    /// List payments, newest first.
    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError>;

    /// Count all payments.
    async fn count(&self) -> Result<u64, DomainError>;

    /// Sum `amount` over payments created at or after `since`.
    ///
    /// `None` for `since` means all payments. Returns `None` when no
    /// payment matched.
    async fn sum_amount(&self, since: Option<Timestamp>) -> Result<Option<f64>, DomainError>;
}
