//! WebhookEventRepository port - ledger of processed processor webhooks.
//!
//! Processors deliver the same event more than once (timeouts, retries after
//! a 5xx, lost acknowledgements). Every event whose handling completed is
//! recorded here under its event id, so a re-delivery is recognised and
//! acknowledged without touching any payment.
//!
//! Events whose handling failed are NOT recorded; the processor's retry
//! must get another chance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, Timestamp};

/// Outcome stored for a processed webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOutcome {
    /// A payment status was changed.
    Success,
    /// Event was acknowledged without changing anything.
    Ignored,
}

impl LedgerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerOutcome::Success => "success",
            LedgerOutcome::Ignored => "ignored",
        }
    }

    /// Parse a stored outcome. Unknown values are treated as ignored.
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => LedgerOutcome::Success,
            _ => LedgerOutcome::Ignored,
        }
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEventRecord {
    /// Processor event ID (evt_xxx format).
    pub event_id: String,

    /// Processor event type (e.g., "payment_intent.succeeded").
    pub event_type: String,

    /// Intent the event referred to, if any.
    pub payment_intent_id: Option<String>,

    pub outcome: LedgerOutcome,

    /// Why the event was ignored, when it was.
    pub reason: Option<String>,

    pub processed_at: Timestamp,
}

impl WebhookEventRecord {
    /// Creates a record for an event that changed a payment.
    pub fn success(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payment_intent_id: Option<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            payment_intent_id,
            outcome: LedgerOutcome::Success,
            reason: None,
            processed_at: Timestamp::now(),
        }
    }

    /// Creates a record for an event acknowledged without effect.
    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payment_intent_id: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            payment_intent_id,
            outcome: LedgerOutcome::Ignored,
            reason: Some(reason.into()),
            processed_at: Timestamp::now(),
        }
    }
}

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event).
    Inserted,
    /// Record already exists (duplicate event).
    AlreadyExists,
}

/// Port for storing and retrieving processed webhook events.
///
/// Implementations should use database constraints (PRIMARY KEY on event_id)
/// to settle concurrent deliveries of the same event.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Find a previously processed event by its event ID.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Attempt to save a webhook event record.
    ///
    /// Uses `ON CONFLICT DO NOTHING` semantics.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Delete records processed before the given timestamp.
    ///
    /// Returns the number of records deleted.
    async fn delete_before(&self, timestamp: Timestamp) -> Result<u64, DomainError>;
}
