//! Server-side transaction aggregates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregates returned by `GET /api/transactions/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    /// All-time inflows.
    pub total_income: Decimal,
    /// All-time outflows.
    pub total_outflows: Decimal,
    /// Inflows minus outflows.
    pub net_profit: Decimal,
    /// Inflows in the current month.
    pub this_month_income: Decimal,
    /// Outflows in the current month.
    pub this_month_outflows: Decimal,
    /// Inflows in the previous month.
    pub last_month_income: Decimal,
    /// Outflows in the previous month.
    pub last_month_outflows: Decimal,
    /// Daily breakdown for the last week, when provided.
    #[serde(default)]
    pub last7_days: Option<Vec<DailyFlow>>,
}

/// Inflows and outflows for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFlow {
    /// Calendar day.
    pub date: NaiveDate,
    /// Inflows on that day.
    pub income: Decimal,
    /// Outflows on that day.
    pub outflows: Decimal,
}

impl TransactionStats {
    /// Month-over-month change of inflows in percent, or `None` when last
    /// month had no inflows.
    #[must_use]
    pub fn income_change_percent(&self) -> Option<Decimal> {
        if self.last_month_income.is_zero() {
            return None;
        }
        let delta = self.this_month_income - self.last_month_income;
        delta
            .checked_div(self.last_month_income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|percent| percent.round_dp(1))
    }
}
