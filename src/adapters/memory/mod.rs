//! In-memory adapters for development and tests.
//!
//! - `InMemoryPaymentStore` - implements both `PaymentRepository` and `PaymentReader`
//! - `InMemoryWebhookEventRepository` - processed webhook ledger
//!
//! Nothing here survives a restart. Production wiring uses the PostgreSQL
//! adapters.

mod payment_store;
mod webhook_event_repository;

pub use payment_store::InMemoryPaymentStore;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
