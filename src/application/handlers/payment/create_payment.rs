//! CreatePaymentHandler - Command handler for recording a payment directly.

use std::sync::Arc;

use tracing::info;

use crate::domain::payment::{Payment, PaymentError, PaymentStatus};
use crate::ports::PaymentRepository;

/// Command to create a payment from caller-supplied fields.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub payment_type: String,
    pub amount: f64,
    pub customer_id: String,
    /// Defaults to `pending` when absent.
    pub status: Option<String>,
}

/// Handler for direct payment creation.
pub struct CreatePaymentHandler {
    repository: Arc<dyn PaymentRepository>,
}

impl CreatePaymentHandler {
    pub fn new(repository: Arc<dyn PaymentRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: CreatePaymentCommand) -> Result<Payment, PaymentError> {
        let status = cmd.status.as_deref().map(PaymentStatus::parse);
        let payment = Payment::create(cmd.payment_type, cmd.amount, cmd.customer_id, status, None)?;

        self.repository.save(&payment).await?;

        info!(
            payment_id = %payment.id,
            customer_id = %payment.customer_id,
            status = %payment.status,
            "Payment created"
        );

        Ok(payment)
    }
}
