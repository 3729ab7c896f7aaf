//! Filter set shared by ledger queries and rendered reports.

use chrono::NaiveDate;

use super::{Transaction, TransactionKind};

/// Scope of a ledger query: optional kind and an optional inclusive date
/// range.
///
/// The same value is sent to the API and described in the report header,
/// so the two can never diverge.
///
/// # Examples
///
/// ```
/// use gym_finance::models::{FilterSet, NaiveDate, TransactionKind};
///
/// let filters = FilterSet::new()
///     .kind(TransactionKind::Expense)
///     .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// assert!(filters.end_date.is_none());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterSet {
    /// Only this kind, when set.
    pub kind: Option<TransactionKind>,
    /// First day included, when set.
    pub start_date: Option<NaiveDate>,
    /// Last day included, when set.
    pub end_date: Option<NaiveDate>,
}

impl FilterSet {
    /// Creates an empty filter set that matches every transaction.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a single transaction kind.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the first day included.
    #[inline]
    #[must_use]
    pub const fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the last day included.
    #[inline]
    #[must_use]
    pub const fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Sets both bounds of the date range.
    #[inline]
    #[must_use]
    pub const fn date_range(self, from: NaiveDate, to: NaiveDate) -> Self {
        self.start_date(from).end_date(to)
    }

    /// Returns `true` when no criterion is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// Query parameters understood by the ledger API. Unset criteria are
    /// omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(kind) = self.kind {
            pairs.push(("transactionType", kind.as_str().to_owned()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.to_string()));
        }
        pairs
    }

    /// Returns `true` if the transaction satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.kind.is_none_or(|kind| tx.kind == kind)
            && self.start_date.is_none_or(|start| tx.occurred_at >= start)
            && self.end_date.is_none_or(|end| tx.occurred_at <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionId;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn tx(kind: TransactionKind, day: u32) -> Transaction {
        Transaction {
            id: TransactionId::new(1),
            member_id: None,
            amount: dec!(10),
            kind,
            category: "misc".to_owned(),
            description: None,
            payment_method: None,
            occurred_at: date(day),
            member: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filters = FilterSet::new();
        assert!(filters.is_empty());
        assert!(filters.query_pairs().is_empty());
        assert!(filters.matches(&tx(TransactionKind::Expense, 3)));
    }

    #[test]
    fn query_pairs_follow_api_names() {
        let filters = FilterSet::new()
            .kind(TransactionKind::PositiveReturn)
            .date_range(date(1), date(31));
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("transactionType", "positive_return".to_owned()),
                ("startDate", "2024-01-01".to_owned()),
                ("endDate", "2024-01-31".to_owned()),
            ]
        );
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filters = FilterSet::new().date_range(date(10), date(20));
        assert!(filters.matches(&tx(TransactionKind::Income, 10)));
        assert!(filters.matches(&tx(TransactionKind::Income, 20)));
        assert!(!filters.matches(&tx(TransactionKind::Income, 9)));
        assert!(!filters.matches(&tx(TransactionKind::Income, 21)));
    }

    #[test]
    fn kind_filter_is_exact() {
        let filters = FilterSet::new().kind(TransactionKind::Income);
        assert!(filters.matches(&tx(TransactionKind::Income, 1)));
        assert!(!filters.matches(&tx(TransactionKind::PositiveReturn, 1)));
    }

    #[test]
    fn open_ended_range() {
        let filters = FilterSet::new().start_date(date(15));
        assert!(!filters.is_empty());
        assert!(filters.matches(&tx(TransactionKind::Expense, 31)));
        assert!(!filters.matches(&tx(TransactionKind::Expense, 14)));
    }
}
