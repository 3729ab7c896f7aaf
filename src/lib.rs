//! Ledger export and reporting for a fitness-center admin API.
//!
//! The crate fetches a filtered transaction ledger in full from a
//! paginated API, totals it by cash-flow direction, and renders it as a
//! quoted CSV file or a paginated PDF table.
//!
//! - [`models`]: transactions, kinds, filters and paging types.
//! - [`client`]: async HTTP client for the ledger API (feature `async`).
//! - [`source`]: the [`source::LedgerSource`] seam and an in-memory ledger.
//! - [`export`]: fetch, aggregate, render and save.

extern crate alloc;

#[cfg(feature = "async")]
pub mod client;
pub mod error;
pub mod export;
pub mod models;
pub mod source;
