//! Data models for the ledger API.
//!
//! Strongly-typed transactions, newtype IDs, the closed set of
//! transaction kinds, the filter set shared by queries and reports, and
//! the paging envelope of list endpoints.

mod enums;
mod filter;
mod ids;
mod page;
mod stats;
mod transaction;

pub use chrono::NaiveDate;
pub use enums::{CashFlow, TransactionKind};
pub use filter::FilterSet;
pub use ids::{MemberId, TransactionId};
pub use page::{Page, PageRequest, PaginatedResponse, PaginationMeta};
pub use stats::{DailyFlow, TransactionStats};
pub use transaction::{Member, Transaction};
