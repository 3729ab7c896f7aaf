//! In-memory paginated ledger.
//!
//! Provides [`InMemoryLedger`], a thread-safe stand-in for the remote
//! transactions endpoint. It filters, pages and reports totals the way the
//! server does, records every page request it serves, and can be told to
//! fail on a given page.

use core::future::{self, Future};
use std::sync::{Mutex, PoisonError};

use crate::error::{LedgerError, Result};
use crate::models::{FilterSet, Page, PageRequest, Transaction};

use super::{LedgerSource, MAX_PAGE_SIZE};

/// Thread-safe in-memory ledger.
///
/// # Example
///
/// ```rust
/// use gym_finance::source::InMemoryLedger;
///
/// let ledger = InMemoryLedger::new().with_page_size(25);
/// assert!(ledger.requests().unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct InMemoryLedger {
    /// Server-side page size cap.
    page_size: u32,
    /// Page number that answers with an error, if any.
    fail_on_page: Option<u32>,
    /// Mutable state behind a single mutex.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Stored ledger rows, in server order.
    transactions: Vec<Transaction>,
    /// Every page request served, in order.
    requests: Vec<PageRequest>,
}

impl Default for InMemoryLedger {
    #[inline]
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            fail_on_page: None,
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl InMemoryLedger {
    /// Creates an empty ledger with the default page size.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server-side page size cap (clamped to `1..=MAX_PAGE_SIZE`).
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Seeds the ledger with rows.
    #[inline]
    #[must_use]
    pub fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.transactions = transactions;
        }
        self
    }

    /// Makes the given page answer with a 503 error.
    #[inline]
    #[must_use]
    pub const fn fail_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    /// Appends rows to the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    #[inline]
    pub fn push(&self, transactions: Vec<Transaction>) -> Result<()> {
        self.with_lock(|inner| inner.transactions.extend(transactions))
    }

    /// Page requests served so far, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    #[inline]
    pub fn requests(&self) -> Result<Vec<PageRequest>> {
        self.with_lock(|inner| inner.requests.clone())
    }

    /// Serves one page the way the API does.
    fn serve(&self, filters: &FilterSet, request: PageRequest) -> Result<Page<Transaction>> {
        let served = PageRequest::new(request.page, request.page_size.min(self.page_size));
        self.with_lock(|inner| inner.requests.push(served))?;
        if self.fail_on_page == Some(request.page) {
            return Err(LedgerError::Api {
                status: 503,
                message: format!("page {} unavailable", request.page),
            });
        }
        self.with_lock(|inner| {
            let matching: Vec<&Transaction> = inner
                .transactions
                .iter()
                .filter(|tx| filters.matches(tx))
                .collect();
            let items = matching
                .iter()
                .skip(served.offset())
                .take(served.page_size as usize)
                .map(|tx| (*tx).clone())
                .collect();
            Page {
                items,
                total_count: matching.len(),
            }
        })
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, op: impl FnOnce(&mut Inner) -> R) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(op(&mut inner))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &PoisonError<T>) -> LedgerError {
    LedgerError::Poisoned(err.to_string())
}

impl LedgerSource for InMemoryLedger {
    #[inline]
    fn page_size(&self) -> u32 {
        self.page_size
    }

    #[inline]
    fn list(
        &self,
        filters: &FilterSet,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Transaction>>> + Send {
        future::ready(self.serve(filters, request))
    }
}
