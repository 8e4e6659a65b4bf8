//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PaymentRepository` - Payment persistence (write side)
//! - `PaymentReader` - Listings and aggregates (read side)
//! - `WebhookEventRepository` - Processed webhook ledger
//!
//! ## Processor Ports
//!
//! - `PaymentProcessor` - Intent creation and webhook verification

mod payment_processor;
mod payment_reader;
mod payment_repository;
mod webhook_event_repository;

pub use payment_processor::{
    CreatePaymentIntentRequest, PaymentIntent, PaymentProcessor, ProcessorError,
    ProcessorErrorCode, WebhookEvent, WebhookEventData, WebhookEventType,
};
pub use payment_reader::{PaymentFilter, PaymentReader};
pub use payment_repository::PaymentRepository;
pub use webhook_event_repository::{
    LedgerOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository,
};
