//! ListPaymentsHandler - Query handler for payment listings.

use std::sync::Arc;

use crate::domain::payment::{Payment, PaymentError};
use crate::ports::{PaymentFilter, PaymentReader};

/// Query for a payment listing, newest first.
#[derive(Debug, Clone)]
pub struct ListPaymentsQuery {
    pub filter: PaymentFilter,
}

impl ListPaymentsQuery {
    pub fn all() -> Self {
        Self {
            filter: PaymentFilter::All,
        }
    }

    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            filter: PaymentFilter::Customer(customer_id.into()),
        }
    }
}

pub struct ListPaymentsHandler {
    reader: Arc<dyn PaymentReader>,
}

impl ListPaymentsHandler {
    pub fn new(reader: Arc<dyn PaymentReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Vec<Payment>, PaymentError> {
        Ok(self.reader.list(&query.filter).await?)
    }
}
