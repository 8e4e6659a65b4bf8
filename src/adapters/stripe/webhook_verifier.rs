//! Stripe webhook signature verification.
//!
//! Verifies `Stripe-Signature` headers with HMAC-SHA256 over
//! `"{timestamp}.{payload}"` and rejects stale or future-dated signatures.
//! Only a verified payload is parsed into a `WebhookEvent`.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{ProcessorError, WebhookEvent, WebhookEventData, WebhookEventType};

use super::webhook_types::{hex_encode, SignatureHeader, StripePaymentIntent, StripeWebhookEvent};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Verifier for Stripe webhook signatures.
#[derive(Clone)]
pub struct StripeWebhookVerifier {
    /// Webhook signing secret (whsec_...).
    secret: SecretString,

    /// Reject events not flagged `livemode`.
    require_livemode: bool,
}

impl StripeWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            require_livemode: false,
        }
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    /// Verify the signature header against the payload and parse the event.
    ///
    /// # Errors
    ///
    /// - `InvalidWebhook` for a missing, malformed, stale, future-dated or
    ///   mismatched signature
    /// - `InvalidPayload` if the signed body is not a usable Stripe event
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, ProcessorError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())?;
        self.parse_event(payload)
    }

    /// Verify a signature as of `now` (Unix seconds).
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), ProcessorError> {
        let header = SignatureHeader::parse(signature_header).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            ProcessorError::invalid_webhook(e.to_string())
        })?;

        let age = now - header.timestamp;
        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(ProcessorError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }
        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(ProcessorError::invalid_webhook("Event timestamp in future"));
        }

        let expected = self.compute_signature(header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));

        if !matched {
            tracing::warn!("Invalid webhook signature");
            return Err(ProcessorError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Build a `Stripe-Signature` header value for `payload` at `timestamp`.
    ///
    /// Used by tests and local tooling to produce deliveries the service
    /// will accept.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, ProcessorError> {
        let signature = self.compute_signature(timestamp, payload)?;
        Ok(format!("t={},v1={}", timestamp, hex_encode(&signature)))
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, ProcessorError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| ProcessorError::invalid_webhook(format!("Unusable webhook secret: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Parse a payload into the port's event type without checking the
    /// signature. Callers must have verified it already.
    pub(crate) fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent, ProcessorError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            ProcessorError::invalid_payload(format!("Invalid JSON: {}", e))
        })?;

        if self.require_livemode && !stripe_event.livemode {
            tracing::warn!(
                event_id = %stripe_event.id,
                "Rejected test mode event in production"
            );
            return Err(ProcessorError::invalid_payload(
                "Test mode events not allowed in production",
            ));
        }

        let event_type = WebhookEventType::from_stripe(&stripe_event.event_type);
        let data = match event_type {
            WebhookEventType::PaymentIntentSucceeded | WebhookEventType::PaymentIntentFailed => {
                let intent: StripePaymentIntent =
                    serde_json::from_value(stripe_event.data.object.clone()).map_err(|e| {
                        ProcessorError::invalid_payload(format!("Invalid payment intent: {}", e))
                    })?;
                WebhookEventData::PaymentIntent {
                    intent_id: intent.id,
                    amount: Some(intent.amount),
                    status: Some(intent.status).filter(|s| !s.is_empty()),
                }
            }
            WebhookEventType::Unknown(_) => WebhookEventData::Raw {
                json: stripe_event.data.object.to_string(),
            },
        };

        Ok(WebhookEvent {
            id: stripe_event.id,
            event_type,
            data,
            created_at: stripe_event.created,
        })
    }
}

/// Constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
