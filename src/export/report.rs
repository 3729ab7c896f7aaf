//! The data behind one rendered export.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{FilterSet, Transaction};

use super::summary::describe;
use super::totals::Totals;

/// Report title printed at the top of both artifacts.
pub const REPORT_TITLE: &str = "Finance Report";

/// Format of the generation timestamp.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Rows, totals and header text of one export. Built fresh per export and
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Every transaction matching the filters, in server order.
    pub rows: Vec<Transaction>,
    /// Totals over `rows`.
    pub totals: Totals,
    /// Filter description shared by both renderers.
    pub summary: String,
    /// Local time the export was generated.
    pub generated_at: NaiveDateTime,
}

impl Report {
    /// Builds a report from fetched rows and the filters that scoped them.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountOverflow`] if the totals overflow.
    ///
    /// [`LedgerError::AmountOverflow`]: crate::error::LedgerError::AmountOverflow
    pub fn new(rows: Vec<Transaction>, filters: &FilterSet, generated_at: NaiveDateTime) -> Result<Self> {
        let totals = Totals::from_rows(&rows)?;
        Ok(Self {
            rows,
            totals,
            summary: describe(filters),
            generated_at,
        })
    }

    /// Generation timestamp as printed in the report header.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
