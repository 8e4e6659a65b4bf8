//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL persistence
//! - `memory` - In-memory persistence for development and tests
//! - `stripe` - Stripe payment processor
//! - `http` - Axum REST API
//! - `events` - Background maintenance of the webhook ledger

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use events::{WebhookLedgerPruner, WebhookLedgerPrunerConfig};
