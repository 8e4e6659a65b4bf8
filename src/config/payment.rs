//! Payment processor configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Longest webhook ledger retention accepted, in days (ten years).
pub const MAX_WEBHOOK_RETENTION_DAYS: u32 = 3650;

/// Payment processor configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key (`sk_...`)
    pub stripe_api_key: String,

    /// Stripe webhook signing secret (`whsec_...`)
    pub stripe_webhook_secret: String,

    /// Currency for intents that do not name one
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Stripe API base URL, overridable for stripe-mock
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Reject webhook events with `livemode: false`
    #[serde(default)]
    pub require_livemode: bool,

    /// Days a processed webhook stays in the ledger
    #[serde(default = "default_webhook_retention_days")]
    pub webhook_retention_days: u32,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT_SERVICE__PAYMENT__STRIPE_API_KEY",
            ));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT_SERVICE__PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::InvalidApiBaseUrl);
        }
        if self.webhook_retention_days == 0
            || self.webhook_retention_days > MAX_WEBHOOK_RETENTION_DAYS
        {
            return Err(ValidationError::InvalidRetention);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            currency: default_currency(),
            api_base_url: default_api_base_url(),
            require_livemode: false,
            webhook_retention_days: default_webhook_retention_days(),
        }
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_webhook_retention_days() -> u32 {
    30
}
