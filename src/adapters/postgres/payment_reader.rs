//! PostgreSQL implementation of PaymentReader.
//!
//! Listings are ordered newest first. Aggregates use `COUNT(*)` and
//! `SUM(amount)`; `SUM` over zero rows is SQL NULL and comes back as `None`.

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::payment::Payment;
use crate::ports::{PaymentFilter, PaymentReader};
use async_trait::async_trait;
use sqlx::PgPool;

use super::payment_repository::{PaymentRow, PAYMENT_COLUMNS};

/// PostgreSQL implementation of the PaymentReader port.
pub struct PostgresPaymentReader {
    pool: PgPool,
}

impl PostgresPaymentReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentReader for PostgresPaymentReader {
    async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = match filter {
            PaymentFilter::All => {
                sqlx::query_as(&format!(
                    "SELECT {} FROM payments ORDER BY created_at DESC",
                    PAYMENT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
            PaymentFilter::Customer(customer_id) => {
                sqlx::query_as(&format!(
                    "SELECT {} FROM payments WHERE customer_id = $1 ORDER BY created_at DESC",
                    PAYMENT_COLUMNS
                ))
                .bind(customer_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::database(format!("Failed to list payments: {}", e)))?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to count payments: {}", e)))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn sum_amount(&self, since: Option<Timestamp>) -> Result<Option<f64>, DomainError> {
        let (sum,): (Option<f64>,) = match since {
            None => {
                sqlx::query_as("SELECT SUM(amount) FROM payments")
                    .fetch_one(&self.pool)
                    .await
            }
            Some(since) => {
                sqlx::query_as("SELECT SUM(amount) FROM payments WHERE created_at >= $1")
                    .bind(since.as_datetime())
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(|e| DomainError::database(format!("Failed to sum payment amounts: {}", e)))?;

        Ok(sum)
    }
}
