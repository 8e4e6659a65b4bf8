//! In-memory processed webhook ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository};

/// In-memory implementation of the WebhookEventRepository port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookEventRepository {
    records: Arc<RwLock<HashMap<String, WebhookEventRecord>>>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.event_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        records.insert(record.event_id.clone(), record);
        Ok(SaveResult::Inserted)
    }

    async fn delete_before(&self, timestamp: Timestamp) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.processed_at >= timestamp);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::LedgerOutcome;

    #[tokio::test]
    async fn second_save_reports_already_exists() {
        let repo = InMemoryWebhookEventRepository::new();
        let record = WebhookEventRecord::success("evt_1", "payment_intent.succeeded", None);

        assert_eq!(repo.save(record.clone()).await.unwrap(), SaveResult::Inserted);
        assert_eq!(repo.save(record).await.unwrap(), SaveResult::AlreadyExists);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn finds_saved_record() {
        let repo = InMemoryWebhookEventRepository::new();
        repo.save(WebhookEventRecord::ignored(
            "evt_2",
            "charge.refunded",
            None,
            "Unhandled event type",
        ))
        .await
        .unwrap();

        let found = repo.find_by_event_id("evt_2").await.unwrap().unwrap();
        assert_eq!(found.outcome, LedgerOutcome::Ignored);
        assert!(repo.find_by_event_id("evt_3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_before_prunes_old_records() {
        let repo = InMemoryWebhookEventRepository::new();
        let mut old = WebhookEventRecord::success("evt_old", "payment_intent.succeeded", None);
        old.processed_at = Timestamp::now().minus_days(40);
        repo.save(old).await.unwrap();
        repo.save(WebhookEventRecord::success(
            "evt_new",
            "payment_intent.succeeded",
            None,
        ))
        .await
        .unwrap();

        let deleted = repo
            .delete_before(Timestamp::now().minus_days(30))
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(repo.find_by_event_id("evt_new").await.unwrap().is_some());
    }
}
