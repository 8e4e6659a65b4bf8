//! In-memory payment store.
//!
//! One shared table backs both the write port and the read port, so a
//! payment saved through `PaymentRepository` is immediately visible to
//! `PaymentReader` queries.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PaymentFilter, PaymentReader, PaymentRepository};

/// Thread-safe in-memory payment table.
///
/// Cloning shares the underlying table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<Vec<Payment>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `DatabaseError` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored payments.
    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payments.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::database("Payment store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentStore {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        self.check_available()?;
        let mut payments = self.payments.write().await;

        if payments.iter().any(|p| p.id == payment.id) {
            return Err(
                DomainError::new(ErrorCode::ValidationFailed, "Payment id already exists")
                    .with_detail("field", "payment_Id"),
            );
        }
        if let Some(intent_id) = &payment.payment_intent_id {
            if payments
                .iter()
                .any(|p| p.payment_intent_id.as_ref() == Some(intent_id))
            {
                return Err(DomainError::new(
                    ErrorCode::ValidationFailed,
                    "A payment already exists for this payment intent",
                )
                .with_detail("field", "payment_intent_id"));
            }
        }

        payments.push(payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        self.check_available()?;
        let payments = self.payments.read().await;
        Ok(payments.iter().find(|p| &p.id == id).cloned())
    }

    async fn find_by_intent_id(&self, intent_id: &str) -> Result<Option<Payment>, DomainError> {
        self.check_available()?;
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .find(|p| p.payment_intent_id.as_deref() == Some(intent_id))
            .cloned())
    }

    async fn update_status(
        &self,
        id: &PaymentId,
        expected: &PaymentStatus,
        new_status: &PaymentStatus,
    ) -> Result<Option<Payment>, DomainError> {
        self.check_available()?;
        let mut payments = self.payments.write().await;

        match payments.iter_mut().find(|p| &p.id == id) {
            Some(payment) if &payment.status == expected => {
                payment.status = new_status.clone();
                Ok(Some(payment.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl PaymentReader for InMemoryPaymentStore {
    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError> {
        self.check_available()?;
        let payments = self.payments.read().await;

        // Later inserts win ties on created_at.
        let mut matching: Vec<Payment> = payments
            .iter()
            .rev()
            .filter(|p| match filter {
                PaymentFilter::All => true,
                PaymentFilter::Customer(customer_id) => &p.customer_id == customer_id,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matching)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        self.check_available()?;
        Ok(self.payments.read().await.len() as u64)
    }

    async fn sum_amount(&self, since: Option<Timestamp>) -> Result<Option<f64>, DomainError> {
        self.check_available()?;
        let payments = self.payments.read().await;

        let amounts: Vec<f64> = payments
            .iter()
            .filter(|p| since.map_or(true, |since| p.created_at >= since))
            .map(|p| p.amount)
            .collect();

        if amounts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(amounts.iter().sum()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(customer: &str, amount: f64) -> Payment {
        Payment::create("card", amount, customer, None, None).unwrap()
    }

    fn payment_created_at(amount: f64, created_at: Timestamp) -> Payment {
        let mut p = payment("cust_1", amount);
        p.created_at = created_at;
        p
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Repository
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn saves_and_finds_by_id() {
        let store = InMemoryPaymentStore::new();
        let p = payment("cust_1", 10.0);

        store.save(&p).await.unwrap();

        let found = store.find_by_id(&p.id).await.unwrap();
        assert_eq!(found, Some(p));
    }

    #[tokio::test]
    async fn find_by_id_returns_none_when_missing() {
        let store = InMemoryPaymentStore::new();
        assert!(store.find_by_id(&PaymentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_intent_id() {
        let store = InMemoryPaymentStore::new();
        let first = Payment::from_intent("pi_1", 1000, "cust_1", "card").unwrap();
        let second = Payment::from_intent("pi_1", 2000, "cust_2", "card").unwrap();

        store.save(&first).await.unwrap();
        let err = store.save(&second).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn finds_by_intent_id() {
        let store = InMemoryPaymentStore::new();
        let p = Payment::from_intent("pi_abc", 5000, "cust_1", "card").unwrap();
        store.save(&p).await.unwrap();

        let found = store.find_by_intent_id("pi_abc").await.unwrap().unwrap();
        assert_eq!(found.id, p.id);
        assert!(store.find_by_intent_id("pi_other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_status_applies_when_expected_matches() {
        let store = InMemoryPaymentStore::new();
        let p = payment("cust_1", 10.0);
        store.save(&p).await.unwrap();

        let updated = store
            .update_status(&p.id, &PaymentStatus::Pending, &PaymentStatus::Succeeded)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, PaymentStatus::Succeeded);
    }

    #[tokio::test]
    async fn update_status_is_noop_when_status_moved() {
        let store = InMemoryPaymentStore::new();
        let p = payment("cust_1", 10.0);
        store.save(&p).await.unwrap();
        store
            .update_status(&p.id, &PaymentStatus::Pending, &PaymentStatus::Failed)
            .await
            .unwrap();

        let result = store
            .update_status(&p.id, &PaymentStatus::Pending, &PaymentStatus::Succeeded)
            .await
            .unwrap();

        assert!(result.is_none());
        let stored = store.find_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn unavailable_store_returns_database_error() {
        let store = InMemoryPaymentStore::new();
        store.set_unavailable(true);

        let err = store.save(&payment("cust_1", 1.0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        store.set_unavailable(false);
        assert!(store.save(&payment("cust_1", 1.0)).await.is_ok());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reader
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn list_is_newest_first_and_filters_by_customer() {
        let store = InMemoryPaymentStore::new();
        let now = Timestamp::now();
        let mut older = payment("cust_1", 1.0);
        older.created_at = now.minus_days(2);
        let mut newer = payment("cust_1", 2.0);
        newer.created_at = now.minus_days(1);
        let other = payment("cust_2", 3.0);

        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();
        store.save(&other).await.unwrap();

        let mine = store
            .list(&PaymentFilter::Customer("cust_1".to_string()))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newer.id);
        assert_eq!(mine[1].id, older.id);

        let all = store.list(&PaymentFilter::All).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, other.id);
    }

    #[tokio::test]
    async fn list_for_unknown_customer_is_empty() {
        let store = InMemoryPaymentStore::new();
        store.save(&payment("cust_1", 1.0)).await.unwrap();

        let result = store
            .list(&PaymentFilter::Customer("nobody".to_string()))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn sum_amount_is_none_when_nothing_matches() {
        let store = InMemoryPaymentStore::new();
        assert_eq!(store.sum_amount(None).await.unwrap(), None);

        store
            .save(&payment_created_at(5.0, Timestamp::now().minus_months(3)))
            .await
            .unwrap();
        let since = Timestamp::now().minus_months(1);
        assert_eq!(store.sum_amount(Some(since)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sum_amount_includes_lower_bound() {
        let store = InMemoryPaymentStore::new();
        let bound = Timestamp::now().minus_days(10);
        store.save(&payment_created_at(4.0, bound)).await.unwrap();
        store
            .save(&payment_created_at(6.0, bound.minus_days(1)))
            .await
            .unwrap();

        assert_eq!(store.sum_amount(Some(bound)).await.unwrap(), Some(4.0));
        assert_eq!(store.sum_amount(None).await.unwrap(), Some(10.0));
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
