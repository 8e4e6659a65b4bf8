//! HTTP adapter for payment endpoints.
//!
//! Exposes the payment domain via REST API:
//! - `POST /v1/customer/payment-intent` - Create processor intent
//! - `POST /v1/customer/payments` - Create payment
//! - `GET /v1/customer/payments/{payment_Id}` - Get payment
//! - `GET /v1/customer/{customer_Id}/payments` - List customer payments
//! - `GET /v1/admin/payments/{payment_Id}` - Get payment
//! - `GET /v1/admin/payments` - List all payments
//! - `GET /v1/admin/statistics/payments` - Payment statistics
//! - `POST /v1/public/stripe-webhook` - Processor webhook
//! - `GET /health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{PaymentApiError, PaymentAppState, WebhookApiError, SIGNATURE_HEADER};
pub use routes::payment_router;
