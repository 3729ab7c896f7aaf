//! Exhaustive paginated fetch.

use std::collections::HashSet;

use crate::error::{LedgerError, Result};
use crate::models::{FilterSet, PageRequest, Transaction};
use crate::source::{LedgerSource, MAX_PAGE_SIZE};

/// Retrieves every transaction matching `filters`.
///
/// Pages are requested one after another starting at page 1, at the
/// source's page size capped to [`MAX_PAGE_SIZE`]. The loop stops when a
/// page comes back short or when the rows collected reach the total the
/// source last reported. A full final page therefore ends the fetch
/// through the total rather than with an extra empty request.
///
/// # Errors
///
/// Any failing page aborts the whole fetch. Partial results are never
/// returned:
///
/// - [`LedgerError::MalformedPage`] if a page is larger than requested or
///   repeats a transaction,
/// - [`LedgerError::IncompleteFetch`] if paging ends below the reported
///   total,
/// - [`LedgerError::PageLimitExceeded`] if the source keeps serving full
///   pages past the number the first total allows.
#[tracing::instrument(skip_all)]
pub async fn fetch_all<S: LedgerSource>(source: &S, filters: &FilterSet) -> Result<Vec<Transaction>> {
    let page_size = source.page_size().min(MAX_PAGE_SIZE);
    if page_size == 0 {
        return Err(LedgerError::MalformedPage {
            page: 1,
            reason: "source reported a page size of zero".to_owned(),
        });
    }
    let size = page_size as usize;

    let mut rows: Vec<Transaction> = Vec::new();
    let mut seen = HashSet::new();
    let mut page_no: u32 = 1;
    let mut page_cap: Option<u32> = None;
    let total = loop {
        let page = source.list(filters, PageRequest::new(page_no, page_size)).await?;
        let fetched = page.items.len();
        if fetched > size {
            return Err(LedgerError::MalformedPage {
                page: page_no,
                reason: format!("{fetched} rows returned for a page size of {page_size}"),
            });
        }
        let total = page.total_count;
        let limit = *page_cap.get_or_insert_with(|| page_limit(total, size));
        for tx in page.items {
            if !seen.insert(tx.id) {
                return Err(LedgerError::MalformedPage {
                    page: page_no,
                    reason: format!("transaction {} returned twice", tx.id),
                });
            }
            rows.push(tx);
        }
        tracing::debug!(page = page_no, fetched, total, collected = rows.len(), "fetched page");

        if fetched < size || rows.len() >= total {
            break total;
        }
        if page_no >= limit {
            return Err(LedgerError::PageLimitExceeded { limit });
        }
        page_no += 1;
    };

    if rows.len() < total {
        return Err(LedgerError::IncompleteFetch {
            expected: total,
            received: rows.len(),
        });
    }
    tracing::debug!(rows = rows.len(), pages = page_no, "fetch complete");
    Ok(rows)
}

/// Highest page number a fetch may request, from the first reported total.
/// One page of slack absorbs rows added while paging.
fn page_limit(total: usize, size: usize) -> u32 {
    u32::try_from(total.div_ceil(size))
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NaiveDate, Page, TransactionId, TransactionKind};
    use crate::source::InMemoryLedger;
    use core::future::{self, Future};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    fn tx(id: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            member_id: None,
            amount: Decimal::from(id),
            kind: TransactionKind::Income,
            category: "membership".to_owned(),
            description: None,
            payment_method: None,
            occurred_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            member: None,
        }
    }

    fn ledger(count: i64, page_size: u32) -> InMemoryLedger {
        InMemoryLedger::new()
            .with_page_size(page_size)
            .with_transactions((1..=count).map(tx).collect())
    }

    #[tokio::test]
    async fn completeness_around_page_boundaries() {
        const P: i64 = 5;
        for count in [0, 1, P - 1, P, P + 1, 2 * P, 2 * P + 1] {
            let source = ledger(count, 5);
            let rows = fetch_all(&source, &FilterSet::new()).await.unwrap();
            let ids: Vec<i64> = rows.iter().map(|row| row.id.into_inner()).collect();
            let expected: Vec<i64> = (1..=count).collect();
            assert_eq!(ids, expected, "count {count}");
        }
    }

    #[tokio::test]
    async fn full_last_page_stops_on_total() {
        let source = ledger(10, 5);
        let rows = fetch_all(&source, &FilterSet::new()).await.unwrap();
        assert_eq!(rows.len(), 10);
        let pages: Vec<u32> = source.requests().unwrap().iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[tokio::test]
    async fn full_last_page_at_max_page_size() {
        let source = InMemoryLedger::new().with_transactions((1..=200).map(tx).collect());
        let rows = fetch_all(&source, &FilterSet::new()).await.unwrap();
        assert_eq!(rows.len(), 200);
        assert_eq!(
            source.requests().unwrap(),
            vec![
                PageRequest::new(1, MAX_PAGE_SIZE),
                PageRequest::new(2, MAX_PAGE_SIZE),
            ]
        );
    }

    #[tokio::test]
    async fn requests_at_source_page_size() {
        let source = ledger(250, 100);
        let rows = fetch_all(&source, &FilterSet::new()).await.unwrap();
        assert_eq!(rows.len(), 250);
        let requests = source.requests().unwrap();
        assert_eq!(
            requests,
            vec![
                PageRequest::new(1, 100),
                PageRequest::new(2, 100),
                PageRequest::new(3, 100),
            ]
        );
    }

    #[tokio::test]
    async fn filters_reach_the_source() {
        let source = ledger(6, 5);
        source
            .push(vec![Transaction {
                kind: TransactionKind::Expense,
                ..tx(7)
            }])
            .unwrap();
        let filters = FilterSet::new().kind(TransactionKind::Expense);
        let rows = fetch_all(&source, &filters).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, TransactionId::new(7));
    }

    #[tokio::test]
    async fn failing_page_aborts() {
        let source = ledger(12, 5).fail_on_page(2);
        let err = fetch_all(&source, &FilterSet::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::Api { status: 503, .. }));
        assert_eq!(source.requests().unwrap().len(), 2);
    }

    /// Source that replays scripted pages.
    #[derive(Debug)]
    struct Scripted {
        /// Pages served in order.
        pages: Mutex<Vec<Page<Transaction>>>,
        /// Page size reported to the fetcher.
        page_size: u32,
    }

    impl Scripted {
        fn new(page_size: u32, pages: Vec<Page<Transaction>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                page_size,
            }
        }
    }

    impl LedgerSource for Scripted {
        fn page_size(&self) -> u32 {
            self.page_size
        }

        fn list(
            &self,
            _filters: &FilterSet,
            _request: PageRequest,
        ) -> impl Future<Output = Result<Page<Transaction>>> + Send {
            let next = self.pages.lock().unwrap().pop().unwrap_or(Page {
                items: Vec::new(),
                total_count: 0,
            });
            future::ready(Ok(next))
        }
    }

    fn page(ids: core::ops::RangeInclusive<i64>, total_count: usize) -> Page<Transaction> {
        Page {
            items: ids.map(tx).collect(),
            total_count,
        }
    }

    #[tokio::test]
    async fn oversized_page_is_rejected() {
        let source = Scripted::new(2, vec![page(1..=3, 3)]);
        let err = fetch_all(&source, &FilterSet::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::MalformedPage { page: 1, .. }));
    }

    #[tokio::test]
    async fn short_page_below_total_is_incomplete() {
        let source = Scripted::new(2, vec![page(1..=2, 5), page(3..=3, 5)]);
        let err = fetch_all(&source, &FilterSet::new()).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::IncompleteFetch {
                expected: 5,
                received: 3
            }
        ));
    }

    #[tokio::test]
    async fn duplicate_rows_are_rejected() {
        let source = Scripted::new(2, vec![page(1..=2, 4), page(2..=3, 4)]);
        let err = fetch_all(&source, &FilterSet::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::MalformedPage { page: 2, .. }));
    }

    /// Source whose total keeps moving ahead of the rows it serves.
    #[derive(Debug)]
    struct Endless;

    impl LedgerSource for Endless {
        fn page_size(&self) -> u32 {
            2
        }

        fn list(
            &self,
            _filters: &FilterSet,
            request: PageRequest,
        ) -> impl Future<Output = Result<Page<Transaction>>> + Send {
            let last = i64::from(request.page) * 2;
            future::ready(Ok(Page {
                items: vec![tx(last - 1), tx(last)],
                total_count: usize::try_from(last).unwrap() + 10,
            }))
        }
    }

    #[tokio::test]
    async fn growing_total_hits_page_limit() {
        let err = fetch_all(&Endless, &FilterSet::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::PageLimitExceeded { limit: 7 }), "{err}");
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let source = Scripted::new(0, Vec::new());
        let err = fetch_all(&source, &FilterSet::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::MalformedPage { .. }));
    }

    #[test]
    fn page_limit_has_slack() {
        assert_eq!(page_limit(0, 100), 1);
        assert_eq!(page_limit(100, 100), 2);
        assert_eq!(page_limit(250, 100), 4);
    }
}
