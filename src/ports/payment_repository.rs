//! Payment repository port (write side).
//!
//! Defines the contract for persisting and retrieving Payment aggregates.
//!
//! # Design
//!
//! - **Insert-only records**: payments are created once and never deleted
//! - **Conditional status updates**: the lifecycle writes through
//!   `update_status`, which only succeeds if the stored status is still
//!   the one the caller read
//!
//! # Example
//!
//! ```ignore
//! async fn settle(repo: &dyn PaymentRepository, intent_id: &str) -> Result<(), DomainError> {
//!     if let Some(payment) = repo.find_by_intent_id(intent_id).await? {
//!         repo.update_status(&payment.id, &payment.status, &PaymentStatus::Succeeded)
//!             .await?;
//!     }
//!     Ok(())
//! }
//! ```

use crate::domain::foundation::{DomainError, PaymentId};
use crate::domain::payment::{Payment, PaymentStatus};
use async_trait::async_trait;

/// Repository port for Payment aggregate persistence.
///
/// Implementations must ensure:
/// - Unique `payment_Id`
/// - Unique `payment_intent_id` when present
/// - Atomic compare-and-set in `update_status`
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new payment.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the id or intent id is already taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Find a payment by its ID.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Find the payment mirroring a processor intent.
    async fn find_by_intent_id(&self, intent_id: &str) -> Result<Option<Payment>, DomainError>;

    /// Set the status of a payment if it is still `expected`.
    ///
    /// Returns the updated payment, or `None` if the payment does not exist
    /// or its status changed since it was read.
    async fn update_status(
        &self,
        id: &PaymentId,
        expected: &PaymentStatus,
        new_status: &PaymentStatus,
    ) -> Result<Option<Payment>, DomainError>;
}
