//! Payment processor port for external payment processing.
//!
//! Defines the contract for payment gateway integrations (e.g., Stripe).
//! The service never moves money itself; it asks the processor for an
//! intent and later learns the outcome from a signed webhook.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any intent-based processor
//! - **Verify before trust**: `verify_webhook` is the only way to turn raw
//!   webhook bytes into an event

use crate::domain::payment::PaymentError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Port for payment processor integrations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a payment intent for the given amount.
    ///
    /// The returned client secret is handed to the front end, which
    /// completes the payment directly with the processor.
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, ProcessorError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// Must fail with `InvalidWebhook` for a missing, malformed, stale or
    /// mismatched signature, before looking at the payload contents.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, ProcessorError>;
}

/// Request to create a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor currency units (cents).
    pub amount: i64,

    /// Lowercase ISO currency code, e.g. `usd`.
    pub currency: String,

    /// Free-form metadata attached to the intent.
    pub metadata: BTreeMap<String, String>,
}

/// Payment intent as returned by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Processor intent ID (pi_...).
    pub id: String,

    /// Secret the client uses to confirm the payment.
    pub client_secret: String,

    /// Amount in minor units.
    pub amount: i64,

    pub currency: String,

    /// Processor-side status, e.g. `requires_payment_method`.
    pub status: String,
}

/// Verified webhook event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from processor (evt_...). Used for deduplication.
    pub id: String,

    pub event_type: WebhookEventType,

    pub data: WebhookEventData,

    /// When the event occurred (Unix timestamp).
    pub created_at: i64,
}

/// Types of webhook events we handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// `payment_intent.succeeded`
    PaymentIntentSucceeded,

    /// `payment_intent.payment_failed`
    PaymentIntentFailed,

    /// Anything else. Accepted and ignored.
    Unknown(String),
}

impl WebhookEventType {
    /// Map a processor event type string.
    pub fn from_stripe(event_type: &str) -> Self {
        match event_type {
            "payment_intent.succeeded" => WebhookEventType::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => WebhookEventType::PaymentIntentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    /// Wire name of the event type.
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentIntentSucceeded => "payment_intent.succeeded",
            WebhookEventType::PaymentIntentFailed => "payment_intent.payment_failed",
            WebhookEventType::Unknown(other) => other,
        }
    }
}

/// Event payload, narrowed to what the lifecycle needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WebhookEventData {
    PaymentIntent {
        intent_id: String,
        amount: Option<i64>,
        status: Option<String>,
    },
    Raw {
        json: String,
    },
}

impl WebhookEventData {
    /// Intent ID carried by the event, if any.
    pub fn intent_id(&self) -> Option<&str> {
        match self {
            WebhookEventData::PaymentIntent { intent_id, .. } => Some(intent_id),
            WebhookEventData::Raw { .. } => None,
        }
    }

    /// Intent amount in minor units, when the processor reported one.
    pub fn intent_amount(&self) -> Option<i64> {
        match self {
            WebhookEventData::PaymentIntent { amount, .. } => *amount,
            WebhookEventData::Raw { .. } => None,
        }
    }

    /// Processor-side intent status, e.g. `succeeded`.
    pub fn intent_status(&self) -> Option<&str> {
        match self {
            WebhookEventData::PaymentIntent { status, .. } => status.as_deref(),
            WebhookEventData::Raw { .. } => None,
        }
    }
}

/// Processor operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorError {
    /// Error code for categorization.
    pub code: ProcessorErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Processor's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl ProcessorError {
    /// Create a new processor error.
    pub fn new(code: ProcessorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the processor's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::NetworkError, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::ProviderError, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::InvalidWebhook, message)
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::InvalidPayload, message)
    }
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProcessorError {}

impl From<ProcessorError> for PaymentError {
    fn from(err: ProcessorError) -> Self {
        match err.code {
            ProcessorErrorCode::InvalidWebhook => PaymentError::InvalidSignature,
            ProcessorErrorCode::InvalidPayload => PaymentError::InvalidPayload(err.message),
            _ => PaymentError::Upstream(err.to_string()),
        }
    }
}

/// Processor error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Processor rejected the request parameters.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Webhook signature missing or invalid.
    InvalidWebhook,

    /// Signed webhook body could not be interpreted.
    InvalidPayload,

    /// Processor API error.
    ProviderError,
}

impl ProcessorErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessorErrorCode::NetworkError | ProcessorErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for ProcessorErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessorErrorCode::NetworkError => "network_error",
            ProcessorErrorCode::AuthenticationError => "authentication_error",
            ProcessorErrorCode::InvalidRequest => "invalid_request",
            ProcessorErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            ProcessorErrorCode::InvalidWebhook => "invalid_webhook",
            ProcessorErrorCode::InvalidPayload => "invalid_payload",
            ProcessorErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_processor_is_object_safe() {
        fn _accepts_dyn(_processor: &dyn PaymentProcessor) {}
    }

    #[test]
    fn event_type_maps_stripe_names() {
        assert_eq!(
            WebhookEventType::from_stripe("payment_intent.succeeded"),
            WebhookEventType::PaymentIntentSucceeded
        );
        assert_eq!(
            WebhookEventType::from_stripe("payment_intent.payment_failed"),
            WebhookEventType::PaymentIntentFailed
        );
        assert_eq!(
            WebhookEventType::from_stripe("charge.refunded"),
            WebhookEventType::Unknown("charge.refunded".to_string())
        );
        assert_eq!(
            WebhookEventType::from_stripe("charge.refunded").as_str(),
            "charge.refunded"
        );
    }

    #[test]
    fn event_data_exposes_intent_fields() {
        let data = WebhookEventData::PaymentIntent {
            intent_id: "pi_1".to_string(),
            amount: Some(5000),
            status: Some("succeeded".to_string()),
        };
        assert_eq!(data.intent_id(), Some("pi_1"));
        assert_eq!(data.intent_amount(), Some(5000));
        assert_eq!(data.intent_status(), Some("succeeded"));

        let raw = WebhookEventData::Raw {
            json: "{}".to_string(),
        };
        assert_eq!(raw.intent_id(), None);
        assert_eq!(raw.intent_amount(), None);
        assert_eq!(raw.intent_status(), None);
    }

    #[test]
    fn processor_error_retryable() {
        assert!(ProcessorErrorCode::NetworkError.is_retryable());
        assert!(ProcessorErrorCode::RateLimitExceeded.is_retryable());
        assert!(!ProcessorErrorCode::InvalidWebhook.is_retryable());
        assert!(ProcessorError::network("timeout").retryable);
    }

    #[test]
    fn processor_error_display() {
        let err = ProcessorError::provider("No such customer").with_provider_code("resource_missing");
        assert_eq!(err.to_string(), "provider_error: No such customer");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn invalid_webhook_converts_to_invalid_signature() {
        let err: PaymentError = ProcessorError::invalid_webhook("bad signature").into();
        assert_eq!(err, PaymentError::InvalidSignature);
    }

    #[test]
    fn other_errors_convert_to_upstream() {
        let err: PaymentError = ProcessorError::network("reset").into();
        assert!(matches!(err, PaymentError::Upstream(_)));
    }
}
