//! Aggregate payment statistics over trailing calendar windows.
//!
//! Window lower bounds are computed with calendar-month arithmetic: one
//! month back from 31 March is the last day of February, and a year is
//! twelve calendar months. A payment is inside a window when its
//! `createdAt` is at or after the lower bound.

use crate::domain::foundation::Timestamp;
use serde::{Deserialize, Serialize};

/// Lower bounds of the trailing windows, all relative to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsWindows {
    pub now: Timestamp,
    pub past_year: Timestamp,
    pub past_six_months: Timestamp,
    pub past_month: Timestamp,
}

impl StatisticsWindows {
    /// Compute window bounds ending at `now`.
    pub fn ending_at(now: Timestamp) -> Self {
        Self {
            now,
            past_year: now.minus_months(12),
            past_six_months: now.minus_months(6),
            past_month: now.minus_months(1),
        }
    }
}

/// Snapshot returned by the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatistics {
    pub total_payments: u64,
    pub total_amount: f64,
    pub total_amount_past_year: f64,
    pub total_amount_past_six_months: f64,
    pub total_amount_past_month: f64,
}

impl PaymentStatistics {
    /// Build a snapshot from raw aggregate results.
    ///
    /// A `None` sum means no rows matched and is reported as zero.
    pub fn from_sums(
        total_payments: u64,
        total_amount: Option<f64>,
        past_year: Option<f64>,
        past_six_months: Option<f64>,
        past_month: Option<f64>,
    ) -> Self {
        Self {
            total_payments,
            total_amount: total_amount.unwrap_or(0.0),
            total_amount_past_year: past_year.unwrap_or(0.0),
            total_amount_past_six_months: past_six_months.unwrap_or(0.0),
            total_amount_past_month: past_month.unwrap_or(0.0),
        }
    }

    /// Snapshot with every field zero.
    pub fn empty() -> Self {
        Self::from_sums(0, None, None, None, None)
    }
}
