//! Stripe payment processor adapter.
//!
//! Implements the `PaymentProcessor` port for Stripe:
//! - Payment intent creation
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_payment_processor;
mod stripe_adapter;
mod webhook_types;
mod webhook_verifier;

pub use mock_payment_processor::{MethodCall, MockPaymentProcessor};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter, DEFAULT_API_BASE_URL};
pub use webhook_types::{
    hex_encode, SignatureHeader, SignatureParseError, StripePaymentIntent, StripeWebhookEvent,
};
pub use webhook_verifier::StripeWebhookVerifier;
