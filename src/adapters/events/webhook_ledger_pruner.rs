//! WebhookLedgerPruner - Background service that bounds the webhook ledger.
//!
//! Processors stop re-delivering an event after a few days, so ledger rows
//! older than the retention period can no longer prevent a duplicate. The
//! pruner deletes them on a fixed interval.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 1h | How often to prune |
//! | `retention_days` | 30 | Age after which records are deleted |
//!
//! ## Graceful Shutdown
//!
//! The service listens on a watch channel and stops after the current pass,
//! or as soon as the sender is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{info, warn};

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::WebhookEventRepository;

/// Configuration for the WebhookLedgerPruner service.
#[derive(Debug, Clone)]
pub struct WebhookLedgerPrunerConfig {
    pub interval: Duration,
    pub retention_days: u32,
}

impl Default for WebhookLedgerPrunerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            retention_days: 30,
        }
    }
}

impl WebhookLedgerPrunerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }
}

/// Background service that deletes expired webhook ledger records.
pub struct WebhookLedgerPruner {
    ledger: Arc<dyn WebhookEventRepository>,
    config: WebhookLedgerPrunerConfig,
}

impl WebhookLedgerPruner {
    pub fn new(ledger: Arc<dyn WebhookEventRepository>, config: WebhookLedgerPrunerConfig) -> Self {
        Self { ledger, config }
    }

    /// Run the prune loop until the shutdown signal is received.
    ///
    /// A failed pass is logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender can never signal again.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Webhook ledger pruner stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.prune_at(Timestamp::now()).await {
                        warn!(error = %e, "Webhook ledger prune failed");
                    }
                }
            }
        }
    }

    /// Delete records older than the retention period, measured from `now`.
    pub async fn prune_at(&self, now: Timestamp) -> Result<u64, DomainError> {
        let cutoff = now.minus_days(i64::from(self.config.retention_days));
        let deleted = self.ledger.delete_before(cutoff).await?;
        if deleted > 0 {
            info!(deleted, retention_days = self.config.retention_days, "Pruned webhook ledger");
        }
        Ok(deleted)
    }
}
