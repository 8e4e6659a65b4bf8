//! Background services for processor webhook events.
//!
//! - `WebhookLedgerPruner` - Deletes expired records from the processed
//!   webhook ledger

mod webhook_ledger_pruner;

pub use webhook_ledger_pruner::{WebhookLedgerPruner, WebhookLedgerPrunerConfig};
