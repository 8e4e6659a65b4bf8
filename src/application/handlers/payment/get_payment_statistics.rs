//! GetPaymentStatisticsHandler - Query handler for the admin statistics snapshot.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{PaymentError, PaymentStatistics, StatisticsWindows};
use crate::ports::PaymentReader;

pub struct GetPaymentStatisticsHandler {
    reader: Arc<dyn PaymentReader>,
}

impl GetPaymentStatisticsHandler {
    pub fn new(reader: Arc<dyn PaymentReader>) -> Self {
        Self { reader }
    }

    /// Snapshot with windows ending now.
    pub async fn handle(&self) -> Result<PaymentStatistics, PaymentError> {
        self.handle_at(Timestamp::now()).await
    }

    /// Snapshot with windows ending at `now`.
    pub async fn handle_at(&self, now: Timestamp) -> Result<PaymentStatistics, PaymentError> {
        let windows = StatisticsWindows::ending_at(now);

        let total_payments = self.reader.count().await?;
        let total_amount = self.reader.sum_amount(None).await?;
        let past_year = self.reader.sum_amount(Some(windows.past_year)).await?;
        let past_six_months = self.reader.sum_amount(Some(windows.past_six_months)).await?;
        let past_month = self.reader.sum_amount(Some(windows.past_month)).await?;

        debug!(total_payments, "Computed payment statistics");

        Ok(PaymentStatistics::from_sums(
            total_payments,
            total_amount,
            past_year,
            past_six_months,
            past_month,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPaymentStore;
    use crate::domain::payment::Payment;
    use crate::ports::PaymentRepository;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    async fn store_with(entries: &[(f64, Timestamp)]) -> InMemoryPaymentStore {
        let store = InMemoryPaymentStore::new();
        for (amount, created_at) in entries {
            let mut payment = Payment::create("card", *amount, "cust_1", None, None).unwrap();
            payment.created_at = *created_at;
            store.save(&payment).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn empty_store_reports_zeros() {
        let handler = GetPaymentStatisticsHandler::new(Arc::new(InMemoryPaymentStore::new()));
        let stats = handler.handle().await.unwrap();
        assert_eq!(stats, PaymentStatistics::empty());
    }

    #[tokio::test]
    async fn windows_restrict_sums() {
        let now = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap());
        let store = store_with(&[
            (100.0, now),
            (200.0, now.minus_months(2)),
            (300.0, now.minus_months(24)),
        ])
        .await;
        let handler = GetPaymentStatisticsHandler::new(Arc::new(store));

        let stats = handler.handle_at(now).await.unwrap();

        assert_eq!(stats.total_payments, 3);
        assert_eq!(stats.total_amount, 600.0);
        assert_eq!(stats.total_amount_past_year, 300.0);
        assert_eq!(stats.total_amount_past_six_months, 300.0);
        assert_eq!(stats.total_amount_past_month, 100.0);
    }

    #[tokio::test]
    async fn window_uses_calendar_months() {
        // 31 March minus one month is 28 February in a non-leap year.
        let now = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap());
        let on_bound =
            Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap());
        let before_bound =
            Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 2, 27, 23, 59, 59).unwrap());
        let store = store_with(&[(10.0, on_bound), (5.0, before_bound)]).await;
        let handler = GetPaymentStatisticsHandler::new(Arc::new(store));

        let stats = handler.handle_at(now).await.unwrap();

        assert_eq!(stats.total_amount_past_month, 10.0);
        assert_eq!(stats.total_amount, 15.0);
    }

    #[tokio::test]
    async fn storage_failure_is_upstream() {
        let store = InMemoryPaymentStore::new();
        store.set_unavailable(true);
        let handler = GetPaymentStatisticsHandler::new(Arc::new(store));

        let err = handler.handle().await.unwrap_err();
        assert!(matches!(err, PaymentError::Upstream(_)));
    }

    proptest! {
        #[test]
        fn totals_match_inputs(amounts in prop::collection::vec(0u32..10_000, 0..20)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let now = Timestamp::now();
                let entries: Vec<(f64, Timestamp)> =
                    amounts.iter().map(|a| (f64::from(*a), now)).collect();
                let handler = GetPaymentStatisticsHandler::new(Arc::new(store_with(&entries).await));

                let stats = handler.handle_at(now).await.unwrap();

                let expected: f64 = amounts.iter().map(|a| f64::from(*a)).sum();
                assert_eq!(stats.total_payments, amounts.len() as u64);
                assert_eq!(stats.total_amount, expected);
                assert_eq!(stats.total_amount_past_month, expected);
                assert!(stats.total_amount_past_month <= stats.total_amount_past_six_months);
                assert!(stats.total_amount_past_six_months <= stats.total_amount_past_year);
            });
        }
    }
}
