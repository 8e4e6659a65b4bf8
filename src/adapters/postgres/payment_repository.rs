//! PostgreSQL implementation of PaymentRepository.
//!
//! Provides persistent storage for Payment aggregates using PostgreSQL.

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::PaymentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by every query that loads a full payment.
pub(super) const PAYMENT_COLUMNS: &str =
    "payment_id, payment_type, amount, status, payment_intent_id, customer_id, created_at";

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new PostgresPaymentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct PaymentRow {
    payment_id: Uuid,
    payment_type: String,
    amount: f64,
    status: String,
    payment_intent_id: Option<String>,
    customer_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        if !row.amount.is_finite() || row.amount < 0.0 {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid amount stored for payment {}: {}", row.payment_id, row.amount),
            ));
        }

        Ok(Payment {
            id: PaymentId::from_uuid(row.payment_id),
            payment_type: row.payment_type,
            amount: row.amount,
            status: PaymentStatus::parse(&row.status),
            payment_intent_id: row.payment_intent_id,
            customer_id: row.customer_id,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn map_insert_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.constraint() {
            Some("payments_payment_intent_id_key") => {
                return DomainError::new(
                    ErrorCode::ValidationFailed,
                    "A payment already exists for this payment intent",
                )
                .with_detail("field", "payment_intent_id");
            }
            Some("payments_pkey") => {
                return DomainError::new(ErrorCode::ValidationFailed, "Payment id already exists")
                    .with_detail("field", "payment_Id");
            }
            _ => {}
        }
    }
    DomainError::database(format!("Failed to save payment: {}", e))
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                payment_id, payment_type, amount, status, payment_intent_id, customer_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(&payment.payment_type)
        .bind(payment.amount)
        .bind(payment.status.as_str())
        .bind(&payment.payment_intent_id)
        .bind(&payment.customer_id)
        .bind(payment.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE payment_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find payment: {}", e)))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_intent_id(&self, intent_id: &str) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE payment_intent_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(intent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find payment by intent: {}", e)))?;

        row.map(Payment::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: &PaymentId,
        expected: &PaymentStatus,
        new_status: &PaymentStatus,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            r#"
            UPDATE payments SET status = $3
            WHERE payment_id = $1 AND status = $2
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(new_status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update payment status: {}", e)))?;

        row.map(Payment::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(amount: f64, status: &str) -> PaymentRow {
        PaymentRow {
            payment_id: Uuid::new_v4(),
            payment_type: "card".to_string(),
            amount,
            status: status.to_string(),
            payment_intent_id: Some("pi_1".to_string()),
            customer_id: "cust_1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_payment() {
        let r = row(50.0, "succeeded");
        let id = r.payment_id;
        let payment = Payment::try_from(r).unwrap();

        assert_eq!(payment.id.as_uuid(), &id);
        assert_eq!(payment.status, PaymentStatus::Succeeded);
        assert_eq!(payment.amount, 50.0);
        assert_eq!(payment.payment_intent_id.as_deref(), Some("pi_1"));
    }

    #[test]
    fn row_keeps_custom_status() {
        let payment = Payment::try_from(row(1.0, "Success")).unwrap();
        assert_eq!(payment.status, PaymentStatus::Other("Success".to_string()));
    }

    #[test]
    fn row_with_negative_amount_is_rejected() {
        let err = Payment::try_from(row(-5.0, "pending")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn column_list_matches_row_fields() {
        for column in [
            "payment_id",
            "payment_type",
            "amount",
            "status",
            "payment_intent_id",
            "customer_id",
            "created_at",
        ] {
            assert!(PAYMENT_COLUMNS.contains(column));
        }
    }
}
