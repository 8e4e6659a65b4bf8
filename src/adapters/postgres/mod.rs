//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentRepository` - Payment persistence and status updates
//! - `PostgresPaymentReader` - Listings and aggregate queries
//! - `PostgresWebhookEventRepository` - Processed webhook ledger

mod payment_reader;
mod payment_repository;
mod webhook_event_repository;

pub use payment_reader::PostgresPaymentReader;
pub use payment_repository::PostgresPaymentRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
