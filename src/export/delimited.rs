//! CSV rendering.
//!
//! Every field is quoted and embedded quotes are doubled. Text fields are
//! sanitized before they reach the writer.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{LedgerError, Result};

use super::report::{REPORT_TITLE, Report};
use super::text::{RowText, format_currency, sanitize};

/// Column titles of the transaction table.
pub const CSV_HEADER: [&str; 8] = [
    "Date",
    "Type",
    "Description",
    "Member",
    "Payment Method",
    "Category",
    "Amount",
    "Status",
];

/// Creates a writer that quotes every field.
fn writer(buffer: Vec<u8>) -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(buffer)
}

/// Unwraps the buffer of a finished writer.
fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|err| LedgerError::Io(err.into_error()))
}

/// Renders `report` as CSV.
///
/// Layout: a title block, a totals block, one blank line, the header row,
/// then one row per transaction.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
#[tracing::instrument(skip_all, fields(rows = report.rows.len()))]
pub fn render_csv(report: &Report) -> Result<Vec<u8>> {
    let mut head = writer(Vec::new());
    head.write_record([REPORT_TITLE])?;
    head.write_record(["Generated", report.timestamp().as_str()])?;
    head.write_record(["Filters", sanitize(&report.summary).as_str()])?;
    head.write_record(["Total Income", format_currency(report.totals.income).as_str()])?;
    head.write_record(["Total Outflow", format_currency(report.totals.outflow).as_str()])?;
    head.write_record(["Net", format_currency(report.totals.net).as_str()])?;
    let mut buffer = finish(head)?;
    buffer.push(b'\n');

    let mut table = writer(buffer);
    table.write_record(CSV_HEADER)?;
    for tx in &report.rows {
        let row = RowText::from_transaction(tx);
        table.write_record(row.record())?;
    }
    let bytes = finish(table)?;
    tracing::debug!(bytes = bytes.len(), "rendered CSV");
    Ok(bytes)
}
