//! GetPaymentHandler - Query handler for a single payment.

use std::sync::Arc;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{Payment, PaymentError};
use crate::ports::PaymentRepository;

/// Query for one payment by its identifier.
///
/// The identifier is kept as the raw path segment; one that is not a valid
/// payment id simply matches nothing.
#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub payment_id: String,
}

pub struct GetPaymentHandler {
    repository: Arc<dyn PaymentRepository>,
}

impl GetPaymentHandler {
    pub fn new(repository: Arc<dyn PaymentRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetPaymentQuery) -> Result<Payment, PaymentError> {
        let id: PaymentId = query
            .payment_id
            .parse()
            .map_err(|_| PaymentError::not_found(&query.payment_id))?;

        self.repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| PaymentError::not_found(&query.payment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPaymentStore;

    #[tokio::test]
    async fn returns_stored_payment() {
        let store = InMemoryPaymentStore::new();
        let payment = Payment::create("card", 12.0, "cust_1", None, None).unwrap();
        store.save(&payment).await.unwrap();
        let handler = GetPaymentHandler::new(Arc::new(store));

        let found = handler
            .handle(GetPaymentQuery {
                payment_id: payment.id.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(found, payment);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let handler = GetPaymentHandler::new(Arc::new(InMemoryPaymentStore::new()));

        let err = handler
            .handle(GetPaymentQuery {
                payment_id: PaymentId::new().to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let handler = GetPaymentHandler::new(Arc::new(InMemoryPaymentStore::new()));

        let err = handler
            .handle(GetPaymentQuery {
                payment_id: "not-a-uuid".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::NotFound("not-a-uuid".to_string()));
    }

    #[tokio::test]
    async fn storage_failure_is_upstream() {
        let store = InMemoryPaymentStore::new();
        store.set_unavailable(true);
        let handler = GetPaymentHandler::new(Arc::new(store));

        let err = handler
            .handle(GetPaymentQuery {
                payment_id: PaymentId::new().to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Upstream(_)));
    }
}
