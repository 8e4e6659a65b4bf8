//! HandlePaymentWebhookHandler - Command handler for processor webhooks.
//!
//! Drives the payment lifecycle: a verified `payment_intent.succeeded` or
//! `payment_intent.payment_failed` event settles the payment mirroring that
//! intent. Every completed delivery is written to the webhook ledger so a
//! re-delivery of the same event id is acknowledged without side effects.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{minor_to_major, PaymentError, PaymentStatus, StatusChange};
use crate::ports::{
    PaymentProcessor, PaymentRepository, SaveResult, WebhookEvent, WebhookEventRecord,
    WebhookEventRepository, WebhookEventType,
};

/// Command to handle a processor webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// Payment moved to `succeeded`.
    PaymentSucceeded {
        payment_id: PaymentId,
        payment_intent_id: String,
    },
    /// Payment moved to `failed`.
    PaymentFailed {
        payment_id: PaymentId,
        payment_intent_id: String,
    },
    /// Payment already had the reported status.
    AlreadyInState {
        payment_id: PaymentId,
        status: PaymentStatus,
    },
    /// Payment is settled the other way; the report was ignored.
    TransitionRejected {
        payment_id: PaymentId,
        current: PaymentStatus,
        requested: PaymentStatus,
    },
    /// No payment mirrors the event's intent.
    PaymentNotFound { payment_intent_id: String },
    /// This event id was handled before.
    AlreadyProcessed { event_id: String },
    /// Event type is not part of the lifecycle.
    Ignored { event_type: String },
}

/// Handler for processor webhooks.
pub struct HandlePaymentWebhookHandler {
    repository: Arc<dyn PaymentRepository>,
    processor: Arc<dyn PaymentProcessor>,
    ledger: Arc<dyn WebhookEventRepository>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        repository: Arc<dyn PaymentRepository>,
        processor: Arc<dyn PaymentProcessor>,
        ledger: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self {
            repository,
            processor,
            ledger,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, PaymentError> {
        // 1. Verify signature and parse. Nothing is read before this succeeds.
        let event = self
            .processor
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                warn!(error = %e, "Webhook verification failed");
                PaymentError::from(e)
            })?;

        // 2. Skip events already handled
        if self.ledger.find_by_event_id(&event.id).await?.is_some() {
            info!(event_id = %event.id, "Webhook event already processed");
            return Ok(HandlePaymentWebhookResult::AlreadyProcessed { event_id: event.id });
        }

        // 3. Map the event type to a target status
        let target = match &event.event_type {
            WebhookEventType::PaymentIntentSucceeded => PaymentStatus::Succeeded,
            WebhookEventType::PaymentIntentFailed => PaymentStatus::Failed,
            WebhookEventType::Unknown(event_type) => {
                debug!(event_id = %event.id, event_type = %event_type, "Ignoring webhook event");
                self.record(WebhookEventRecord::ignored(
                    &event.id,
                    event_type,
                    event.data.intent_id().map(str::to_string),
                    "Unhandled event type",
                ))
                .await?;
                return Ok(HandlePaymentWebhookResult::Ignored {
                    event_type: event_type.clone(),
                });
            }
        };

        let intent_id = event
            .data
            .intent_id()
            .ok_or_else(|| PaymentError::InvalidPayload("event has no payment intent".to_string()))?
            .to_string();

        // 4. Settle the matching payment
        let result = self.settle(&event, &intent_id, target).await?;

        // 5. Record the delivery
        let record = match &result {
            HandlePaymentWebhookResult::PaymentSucceeded { .. }
            | HandlePaymentWebhookResult::PaymentFailed { .. } => WebhookEventRecord::success(
                &event.id,
                event.event_type.as_str(),
                Some(intent_id),
            ),
            other => WebhookEventRecord::ignored(
                &event.id,
                event.event_type.as_str(),
                Some(intent_id),
                ignore_reason(other),
            ),
        };
        self.record(record).await?;

        Ok(result)
    }

    async fn settle(
        &self,
        event: &WebhookEvent,
        intent_id: &str,
        target: PaymentStatus,
    ) -> Result<HandlePaymentWebhookResult, PaymentError> {
        let Some(mut payment) = self.repository.find_by_intent_id(intent_id).await? else {
            warn!(
                event_id = %event.id,
                payment_intent_id = %intent_id,
                "No payment found for webhook intent"
            );
            return Ok(HandlePaymentWebhookResult::PaymentNotFound {
                payment_intent_id: intent_id.to_string(),
            });
        };

        if let Some(reported) = event.data.intent_amount() {
            if minor_to_major(reported) != payment.amount {
                warn!(
                    event_id = %event.id,
                    payment_id = %payment.id,
                    reported_amount = reported,
                    stored_amount = payment.amount,
                    "Webhook intent amount differs from stored payment"
                );
            }
        }

        let from = match payment.apply_processor_status(target.clone()) {
            StatusChange::Applied { from } => from,
            StatusChange::Unchanged => {
                info!(payment_id = %payment.id, status = %target, "Payment already in reported state");
                return Ok(HandlePaymentWebhookResult::AlreadyInState {
                    payment_id: payment.id,
                    status: target,
                });
            }
            StatusChange::Rejected { current } => {
                warn!(
                    event_id = %event.id,
                    payment_id = %payment.id,
                    current = %current,
                    requested = %target,
                    "Rejected status change for settled payment"
                );
                return Ok(HandlePaymentWebhookResult::TransitionRejected {
                    payment_id: payment.id,
                    current,
                    requested: target,
                });
            }
        };

        match self
            .repository
            .update_status(&payment.id, &from, &target)
            .await?
        {
            Some(updated) => {
                info!(
                    event_id = %event.id,
                    event_created_at = event.created_at,
                    payment_id = %updated.id,
                    from = %from,
                    to = %updated.status,
                    processor_status = event.data.intent_status().unwrap_or("unknown"),
                    "Payment status updated"
                );
                Ok(settled(updated.id, intent_id, &target))
            }
            // Status changed between read and write; report what is stored now.
            None => self.after_lost_update(payment.id, intent_id, target).await,
        }
    }

    async fn after_lost_update(
        &self,
        payment_id: PaymentId,
        intent_id: &str,
        target: PaymentStatus,
    ) -> Result<HandlePaymentWebhookResult, PaymentError> {
        match self.repository.find_by_id(&payment_id).await? {
            Some(current) if current.status == target => {
                Ok(HandlePaymentWebhookResult::AlreadyInState {
                    payment_id,
                    status: target,
                })
            }
            Some(current) => {
                warn!(
                    payment_id = %payment_id,
                    current = %current.status,
                    requested = %target,
                    "Concurrent status change won"
                );
                Ok(HandlePaymentWebhookResult::TransitionRejected {
                    payment_id,
                    current: current.status,
                    requested: target,
                })
            }
            None => Ok(HandlePaymentWebhookResult::PaymentNotFound {
                payment_intent_id: intent_id.to_string(),
            }),
        }
    }

    async fn record(&self, record: WebhookEventRecord) -> Result<(), PaymentError> {
        let event_id = record.event_id.clone();
        if self.ledger.save(record).await? == SaveResult::AlreadyExists {
            debug!(event_id = %event_id, "Webhook event recorded concurrently");
        }
        Ok(())
    }
}

fn settled(
    payment_id: PaymentId,
    intent_id: &str,
    status: &PaymentStatus,
) -> HandlePaymentWebhookResult {
    let payment_intent_id = intent_id.to_string();
    if *status == PaymentStatus::Succeeded {
        HandlePaymentWebhookResult::PaymentSucceeded {
            payment_id,
            payment_intent_id,
        }
    } else {
        HandlePaymentWebhookResult::PaymentFailed {
            payment_id,
            payment_intent_id,
        }
    }
}

fn ignore_reason(result: &HandlePaymentWebhookResult) -> &'static str {
    match result {
        HandlePaymentWebhookResult::AlreadyInState { .. } => "Payment already in reported state",
        HandlePaymentWebhookResult::TransitionRejected { .. } => "Payment already settled",
        HandlePaymentWebhookResult::PaymentNotFound { .. } => "Payment not found",
        _ => "No action taken",
    }
}
