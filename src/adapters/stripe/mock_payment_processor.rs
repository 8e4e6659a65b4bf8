//! Mock payment processor for testing.
//!
//! Provides a configurable implementation of `PaymentProcessor` for unit
//! and integration tests. Supports:
//! - Pre-configured intent responses
//! - Error injection
//! - Call tracking
//! - Real HMAC verification against a test secret

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::ports::{
    CreatePaymentIntentRequest, PaymentIntent, PaymentProcessor, ProcessorError, WebhookEvent,
};

use super::webhook_verifier::StripeWebhookVerifier;

/// Mock payment processor for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProcessor::with_webhook_secret("whsec_test");
/// let payload = MockPaymentProcessor::intent_event_payload("evt_1", "payment_intent.succeeded", "pi_1");
/// let header = mock.sign(&payload)?;
/// let event = mock.verify_webhook(payload.as_bytes(), &header).await?;
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProcessor {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Next intent to return from `create_payment_intent`.
    next_intent: Option<PaymentIntent>,

    /// Counter for generated intent ids.
    intents_created: u64,

    /// Error to return on next call.
    next_error: Option<ProcessorError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, ProcessorError>,

    call_log: Vec<MethodCall>,

    webhook_verify_mode: WebhookVerifyMode,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Parse any payload without checking the signature.
    #[default]
    AcceptAll,

    /// Check signatures exactly as the Stripe adapter does.
    Signed(StripeWebhookVerifier),

    /// Always fail verification.
    AlwaysFail,
}

impl MockPaymentProcessor {
    /// Create a new mock that skips signature checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that verifies signatures against `secret`.
    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode =
            WebhookVerifyMode::Signed(StripeWebhookVerifier::new(SecretString::new(secret.into())));
        mock
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the intent to return on next `create_payment_intent` call.
    pub fn set_intent(&self, intent: PaymentIntent) {
        self.state().next_intent = Some(intent);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: ProcessorError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: ProcessorError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Helpers
    // ════════════════════════════════════════════════════════════════════════════

    /// Sign `payload` with the configured secret at the current time.
    ///
    /// Returns a header that will never verify when the mock was not
    /// built with `with_webhook_secret`.
    pub fn sign(&self, payload: &str) -> Result<String, ProcessorError> {
        let now = chrono::Utc::now().timestamp();
        match &self.state().webhook_verify_mode {
            WebhookVerifyMode::Signed(verifier) => verifier.sign(payload.as_bytes(), now),
            _ => Ok(format!("t={},v1={}", now, "00".repeat(32))),
        }
    }

    /// Build a Stripe-shaped payment intent event body.
    pub fn intent_event_payload(event_id: &str, event_type: &str, intent_id: &str) -> String {
        serde_json::json!({
            "id": event_id,
            "object": "event",
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "livemode": false,
            "data": {
                "object": {
                    "id": intent_id,
                    "object": "payment_intent",
                    "amount": 5000,
                    "currency": "usd",
                    "status": match event_type {
                        "payment_intent.succeeded" => "succeeded",
                        _ => "requires_payment_method",
                    },
                }
            }
        })
        .to_string()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), ProcessorError> {
        let mut state = self.state();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, ProcessorError> {
        self.record_call(
            "create_payment_intent",
            vec![request.amount.to_string(), request.currency.clone()],
        );
        self.check_error("create_payment_intent")?;

        let mut state = self.state();
        if let Some(intent) = state.next_intent.take() {
            return Ok(intent);
        }

        state.intents_created += 1;
        let id = format!("pi_mock_{}", state.intents_created);
        Ok(PaymentIntent {
            client_secret: format!("{}_secret_{}", id, uuid::Uuid::new_v4().simple()),
            id,
            amount: request.amount,
            currency: request.currency,
            status: "requires_payment_method".to_string(),
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, ProcessorError> {
        self.record_call(
            "verify_webhook",
            vec![
                String::from_utf8_lossy(payload).chars().take(50).collect(),
                signature.chars().take(20).collect(),
            ],
        );
        self.check_error("verify_webhook")?;

        let mode = self.state().webhook_verify_mode.clone();
        match mode {
            WebhookVerifyMode::AcceptAll => {
                StripeWebhookVerifier::new(SecretString::new(String::new())).parse_event(payload)
            }
            WebhookVerifyMode::Signed(verifier) => verifier.verify_and_parse(payload, signature),
            WebhookVerifyMode::AlwaysFail => {
                Err(ProcessorError::invalid_webhook("Verification disabled"))
            }
        }
    }
}
