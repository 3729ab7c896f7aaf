//! Finance export pipeline.
//!
//! [`fetch_all`] pulls the complete filtered ledger, [`Report`] aggregates
//! it and describes the filters, and the report is rendered as CSV or as a
//! paginated PDF table. [`ExportSession`] ties the steps together and
//! hands the file to a [`FileSink`].

mod delimited;
mod fetch;
mod layout;
mod pdf;
mod report;
mod session;
mod sink;
mod summary;
mod text;
mod totals;

pub use delimited::{CSV_HEADER, render_csv};
pub use fetch::fetch_all;
pub use layout::{COLUMNS, Canvas, Column, LayoutStats, PageGeometry, TextStyle, layout_document, layout_with};
pub use pdf::{PdfCanvas, render_pdf};
pub use report::{REPORT_TITLE, Report};
pub use session::{ExportFormat, ExportSession, ExportState, export_file_name};
#[cfg(feature = "sink-file")]
pub use sink::DirectorySink;
pub use sink::{ExportFile, FileSink, MemorySink};
pub use summary::{ALL_FILTERS, describe};
pub use text::{
    CURRENCY, NO_COUNTERPARTY, NO_PAYMENT_METHOD, STATUS_COMPLETED, format_currency,
    format_signed_amount, sanitize, single_line, truncate,
};
pub use totals::{Totals, aggregate};
