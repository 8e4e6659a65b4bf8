//! Payment handlers.
//!
//! ## Commands
//! - Creating payments directly
//! - Creating processor payment intents
//! - Processing processor webhooks (payment lifecycle)
//!
//! ## Queries
//! - Get a single payment
//! - List payments (all, or by customer)
//! - Get payment statistics (admin)

mod create_payment;
mod create_payment_intent;
mod get_payment;
mod get_payment_statistics;
mod handle_payment_webhook;
mod list_payments;

// Commands
pub use create_payment::{CreatePaymentCommand, CreatePaymentHandler};
pub use create_payment_intent::{
    CreatePaymentIntentCommand, CreatePaymentIntentHandler, CreatePaymentIntentResult,
    DEFAULT_PAYMENT_TYPE,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};

// Queries
pub use get_payment::{GetPaymentHandler, GetPaymentQuery};
pub use get_payment_statistics::GetPaymentStatisticsHandler;
pub use list_payments::{ListPaymentsHandler, ListPaymentsQuery};
