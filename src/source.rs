//! Paginated ledger sources.
//!
//! [`LedgerSource`] is the seam between the export pipeline and the remote
//! API. The HTTP client implements it, and so does [`InMemoryLedger`],
//! which simulates a paginated server for tests and fixtures.

mod memory;

use core::future::Future;

use crate::error::Result;
use crate::models::{FilterSet, Page, PageRequest, Transaction};

pub use memory::InMemoryLedger;

/// Largest page the ledger API serves. Requests never ask for more.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A read-only, paginated view of the transaction ledger.
pub trait LedgerSource: core::fmt::Debug + Send + Sync {
    /// Page size to request, at most [`MAX_PAGE_SIZE`].
    #[inline]
    fn page_size(&self) -> u32 {
        MAX_PAGE_SIZE
    }

    /// Lists one page of transactions matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be retrieved or decoded.
    fn list(
        &self,
        filters: &FilterSet,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Transaction>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_ceiling_is_pinned() {
        assert_eq!(MAX_PAGE_SIZE, 100);
    }

    #[test]
    fn default_page_size_is_the_ceiling() {
        assert_eq!(InMemoryLedger::new().page_size(), MAX_PAGE_SIZE);
    }
}
