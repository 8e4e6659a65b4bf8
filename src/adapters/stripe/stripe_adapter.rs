//! Stripe payment processor adapter.
//!
//! Implements the `PaymentProcessor` trait against the Stripe REST API:
//! payment intent creation plus webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::ports::{
    CreatePaymentIntentRequest, PaymentIntent, PaymentProcessor, ProcessorError,
    ProcessorErrorCode, WebhookEvent,
};

use super::webhook_types::{StripeErrorResponse, StripePaymentIntent};
use super::webhook_verifier::StripeWebhookVerifier;

/// Default Stripe API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Whether to require livemode events.
    require_livemode: bool,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
        }
    }

    /// Build from the application's payment configuration section.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self::new(
            config.stripe_api_key.clone(),
            config.stripe_webhook_secret.clone(),
        )
        .with_base_url(config.api_base_url.clone())
        .with_require_livemode(config.require_livemode)
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Require livemode events.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment processor adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    verifier: StripeWebhookVerifier,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.clone())
            .with_require_livemode(config.require_livemode);
        Self {
            config,
            verifier,
            http_client: reqwest::Client::new(),
        }
    }

    /// Form parameters for `POST /v1/payment_intents`.
    fn intent_params(request: &CreatePaymentIntentRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
        ];
        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }
        params
    }

    /// Map a non-success Stripe response to a processor error.
    fn error_from_response(status: reqwest::StatusCode, body: &str) -> ProcessorError {
        let code = match status.as_u16() {
            401 | 403 => ProcessorErrorCode::AuthenticationError,
            400 | 402 | 404 => ProcessorErrorCode::InvalidRequest,
            429 => ProcessorErrorCode::RateLimitExceeded,
            _ => ProcessorErrorCode::ProviderError,
        };

        match serde_json::from_str::<StripeErrorResponse>(body) {
            Ok(parsed) => {
                let message = parsed
                    .error
                    .message
                    .unwrap_or_else(|| parsed.error.error_type.clone());
                let err = ProcessorError::new(code, format!("Stripe API error: {}", message));
                match parsed.error.code {
                    Some(provider_code) => err.with_provider_code(provider_code),
                    None => err,
                }
            }
            Err(_) => ProcessorError::new(code, format!("Stripe API error: {}", body)),
        }
    }
}

#[async_trait]
impl PaymentProcessor for StripePaymentAdapter {
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, ProcessorError> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        let params = Self::intent_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProcessorError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Stripe create_payment_intent failed");
            return Err(Self::error_from_response(status, &error_text));
        }

        let intent: StripePaymentIntent = response.json().await.map_err(|e| {
            ProcessorError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            ProcessorError::provider("Stripe response did not include a client secret")
        })?;

        tracing::info!(intent_id = %intent.id, amount = intent.amount, "Payment intent created");

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, ProcessorError> {
        let event = self.verifier.verify_and_parse(payload, signature)?;

        tracing::info!(
            event_id = %event.id,
            event_type = event.event_type.as_str(),
            "Webhook signature verified"
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn test_config() -> StripeConfig {
        StripeConfig::new("sk_test_key", "whsec_test_secret")
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("api_key", "webhook_secret");
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert!(!config.require_livemode);
    }

    #[test]
    fn config_with_base_url_strips_trailing_slash() {
        let config = test_config().with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }

    #[test]
    fn config_from_payment_config() {
        let payment = PaymentConfig {
            stripe_api_key: "sk_test_abc".to_string(),
            stripe_webhook_secret: "whsec_abc".to_string(),
            currency: "usd".to_string(),
            api_base_url: "http://stripe-mock:12111".to_string(),
            require_livemode: true,
            ..Default::default()
        };
        let config = StripeConfig::from_payment_config(&payment);
        assert_eq!(config.api_base_url, "http://stripe-mock:12111");
        assert!(config.require_livemode);
        assert_eq!(config.api_key.expose_secret(), "sk_test_abc");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Request Building Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn intent_params_include_amount_currency_and_metadata() {
        let mut metadata = BTreeMap::new();
        metadata.insert("customer_Id".to_string(), "cust_1".to_string());
        let request = CreatePaymentIntentRequest {
            amount: 5000,
            currency: "usd".to_string(),
            metadata,
        };

        let params = StripePaymentAdapter::intent_params(&request);

        assert_eq!(
            params,
            vec![
                ("amount".to_string(), "5000".to_string()),
                ("currency".to_string(), "usd".to_string()),
                ("metadata[customer_Id]".to_string(), "cust_1".to_string()),
            ]
        );
    }

    #[test]
    fn error_from_response_parses_stripe_body() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"amount_too_small","message":"Amount must be at least $0.50 usd"}}"#;
        let err = StripePaymentAdapter::error_from_response(reqwest::StatusCode::BAD_REQUEST, body);

        assert_eq!(err.code, ProcessorErrorCode::InvalidRequest);
        assert_eq!(err.provider_code.as_deref(), Some("amount_too_small"));
        assert!(err.message.contains("at least $0.50"));
    }

    #[test]
    fn error_from_response_handles_opaque_body() {
        let err = StripePaymentAdapter::error_from_response(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "slow down",
        );
        assert_eq!(err.code, ProcessorErrorCode::RateLimitExceeded);
        assert!(err.retryable);
    }

    #[test]
    fn error_from_response_maps_auth_failures() {
        let err =
            StripePaymentAdapter::error_from_response(reqwest::StatusCode::UNAUTHORIZED, "{}");
        assert_eq!(err.code, ProcessorErrorCode::AuthenticationError);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn verify_webhook_valid_signature_and_payload() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{
            "id": "evt_test123",
            "type": "payment_intent.payment_failed",
            "created": 1704067200,
            "data": {"object": {"id": "pi_test", "object": "payment_intent", "amount": 5000, "currency": "usd", "status": "requires_payment_method"}},
            "livemode": false
        }"#;

        let verifier = StripeWebhookVerifier::new(SecretString::new("whsec_test_secret".into()));
        let signature = verifier
            .sign(payload.as_bytes(), chrono::Utc::now().timestamp())
            .unwrap();

        let event = adapter
            .verify_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap();

        assert_eq!(event.id, "evt_test123");
        assert_eq!(event.data.intent_id(), Some("pi_test"));
    }

    #[tokio::test]
    async fn verify_webhook_rejects_invalid_signature() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;

        let result = adapter
            .verify_webhook(payload.as_bytes(), "t=1704067200,v1=invalid_signature_hex")
            .await;

        assert_eq!(result.unwrap_err().code, ProcessorErrorCode::InvalidWebhook);
    }

    #[tokio::test]
    async fn create_payment_intent_reports_network_failure() {
        // Port 9 (discard) is never listening in test environments.
        let adapter =
            StripePaymentAdapter::new(test_config().with_base_url("http://127.0.0.1:9"));
        let request = CreatePaymentIntentRequest {
            amount: 100,
            currency: "usd".to_string(),
            metadata: BTreeMap::new(),
        };

        let err = adapter.create_payment_intent(request).await.unwrap_err();
        assert_eq!(err.code, ProcessorErrorCode::NetworkError);
    }
}
