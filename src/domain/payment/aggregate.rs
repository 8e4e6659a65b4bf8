//! Payment aggregate entity.
//!
//! A Payment is a single charge attempt for a customer. It is created either
//! directly by a caller or as the local mirror of a processor intent, and
//! after creation only its status ever changes.
//!
//! # Design Decisions
//!
//! - **Wire names are the contract**: `payment_Id`, `customer_Id` and
//!   `createdAt` are kept exactly as existing clients expect them
//! - **Major units**: `amount` is stored in major currency units; processor
//!   amounts (minor units) are divided by 100 on the way in
//! - **Never deleted**: records are only created and status-updated

use crate::domain::foundation::{PaymentId, StateMachine, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

use super::PaymentStatus;

/// Minor units per major unit for every supported currency.
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// Payment aggregate.
///
/// # Invariants
///
/// - `id` is globally unique and immutable
/// - `amount` is finite and non-negative
/// - `payment_intent_id`, when present, identifies at most one payment
/// - Settled payments (`succeeded`, `failed`) never change status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "payment_Id")]
    pub id: PaymentId,

    pub payment_type: String,

    pub amount: f64,

    pub status: PaymentStatus,

    /// Processor correlation id, set for intent-backed payments.
    pub payment_intent_id: Option<String>,

    #[serde(rename = "customer_Id")]
    pub customer_id: String,

    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
}

/// Result of applying a processor-reported status to a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// Status moved from `from` to the target.
    Applied { from: PaymentStatus },

    /// Payment was already in the target status. Nothing changed.
    Unchanged,

    /// Payment is settled the other way; the report is ignored.
    Rejected { current: PaymentStatus },
}

impl Payment {
    /// Create a payment from caller-supplied fields.
    ///
    /// Status defaults to `pending` when not supplied.
    ///
    /// # Errors
    ///
    /// Returns error if a required field is blank or the amount is negative
    /// or not finite.
    pub fn create(
        payment_type: impl Into<String>,
        amount: f64,
        customer_id: impl Into<String>,
        status: Option<PaymentStatus>,
        payment_intent_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let payment_type = payment_type.into();
        let customer_id = customer_id.into();

        require_non_blank("payment_type", &payment_type)?;
        require_non_blank("customer_Id", &customer_id)?;
        validate_amount(amount)?;
        if let Some(PaymentStatus::Other(label)) = &status {
            require_non_blank("status", label)?;
        }
        if let Some(intent_id) = &payment_intent_id {
            require_non_blank("payment_intent_id", intent_id)?;
        }

        Ok(Self {
            id: PaymentId::new(),
            payment_type,
            amount,
            status: status.unwrap_or_default(),
            payment_intent_id,
            customer_id,
            created_at: Timestamp::now(),
        })
    }

    /// Create the pending mirror of a processor intent.
    ///
    /// `amount_minor` is the processor amount in minor units (5000 means 50.00).
    pub fn from_intent(
        payment_intent_id: impl Into<String>,
        amount_minor: i64,
        customer_id: impl Into<String>,
        payment_type: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if amount_minor <= 0 {
            return Err(ValidationError::invalid_value(
                "amount",
                "must be a positive integer in minor units",
            ));
        }
        Self::create(
            payment_type,
            minor_to_major(amount_minor),
            customer_id,
            Some(PaymentStatus::Pending),
            Some(payment_intent_id.into()),
        )
    }

    /// Apply a status reported by the processor.
    ///
    /// Re-delivery of the current status is a no-op. A report that would
    /// move a settled payment to the opposite outcome is rejected without
    /// touching the payment.
    pub fn apply_processor_status(&mut self, target: PaymentStatus) -> StatusChange {
        if self.status == target {
            return StatusChange::Unchanged;
        }
        match self.status.transition_to(target) {
            Ok(next) => {
                let from = std::mem::replace(&mut self.status, next);
                StatusChange::Applied { from }
            }
            Err(_) => StatusChange::Rejected {
                current: self.status.clone(),
            },
        }
    }

    /// Check if the processor has settled this payment.
    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

/// Convert processor minor units to the stored major-unit amount.
pub fn minor_to_major(amount_minor: i64) -> f64 {
    amount_minor as f64 / MINOR_UNITS_PER_MAJOR
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::invalid_value("amount", "must be a finite number"));
    }
    if amount < 0.0 {
        return Err(ValidationError::invalid_value("amount", "must be non-negative"));
    }
    Ok(())
}
