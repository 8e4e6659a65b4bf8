//! CreatePaymentIntentHandler - Command handler for starting a processor-backed payment.
//!
//! Asks the processor for an intent, then records the local `pending`
//! mirror of it. The processor's webhook later settles the payment.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::domain::payment::{Payment, PaymentError};
use crate::ports::{CreatePaymentIntentRequest, PaymentProcessor, PaymentRepository};

/// Payment type recorded when the caller does not name one.
pub const DEFAULT_PAYMENT_TYPE: &str = "card";

/// Command to create a payment intent.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentCommand {
    /// Amount in minor currency units (5000 means 50.00).
    pub amount: i64,
    /// ISO currency code. The handler's default applies when absent.
    pub currency: Option<String>,
    pub customer_id: String,
    pub payment_type: Option<String>,
}

/// Result of successful intent creation.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentResult {
    pub payment: Payment,
    pub client_secret: String,
}

/// Handler for payment intent creation.
pub struct CreatePaymentIntentHandler {
    processor: Arc<dyn PaymentProcessor>,
    repository: Arc<dyn PaymentRepository>,
    default_currency: String,
}

impl CreatePaymentIntentHandler {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        repository: Arc<dyn PaymentRepository>,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            processor,
            repository,
            default_currency: default_currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentIntentCommand,
    ) -> Result<CreatePaymentIntentResult, PaymentError> {
        // 1. Validate before anything reaches the processor
        if cmd.amount <= 0 {
            return Err(PaymentError::validation(
                "amount",
                "must be a positive integer in minor units",
            ));
        }
        if cmd.customer_id.trim().is_empty() {
            return Err(PaymentError::validation("customer_Id", "cannot be empty"));
        }
        let payment_type = cmd
            .payment_type
            .unwrap_or_else(|| DEFAULT_PAYMENT_TYPE.to_string());
        if payment_type.trim().is_empty() {
            return Err(PaymentError::validation("payment_type", "cannot be empty"));
        }
        let currency = normalize_currency(cmd.currency.as_deref().unwrap_or(&self.default_currency))?;

        // 2. Create the intent with the processor
        let mut metadata = BTreeMap::new();
        metadata.insert("customer_Id".to_string(), cmd.customer_id.clone());
        metadata.insert("payment_type".to_string(), payment_type.clone());

        let intent = self
            .processor
            .create_payment_intent(CreatePaymentIntentRequest {
                amount: cmd.amount,
                currency,
                metadata,
            })
            .await?;

        // 3. Record the pending mirror
        let payment = Payment::from_intent(&intent.id, cmd.amount, cmd.customer_id, payment_type)?;

        if let Err(e) = self.repository.save(&payment).await {
            error!(
                payment_intent_id = %intent.id,
                error = %e,
                "Payment intent created but local record could not be saved"
            );
            return Err(e.into());
        }

        info!(
            payment_id = %payment.id,
            payment_intent_id = %intent.id,
            amount = payment.amount,
            "Payment intent created"
        );

        Ok(CreatePaymentIntentResult {
            payment,
            client_secret: intent.client_secret,
        })
    }
}

/// Lowercase a currency code after checking it is three ASCII letters.
fn normalize_currency(currency: &str) -> Result<String, PaymentError> {
    let trimmed = currency.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(PaymentError::validation(
            "currency",
            "must be a three-letter ISO currency code",
        ));
    }
    Ok(trimmed.to_ascii_lowercase())
}
