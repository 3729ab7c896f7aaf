//! Export orchestration and its state machine.

use core::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::{LedgerError, Result};
use crate::models::FilterSet;
use crate::source::LedgerSource;

use super::delimited::render_csv;
use super::fetch::fetch_all;
use super::pdf::render_pdf;
use super::report::Report;
use super::sink::{ExportFile, FileSink};

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Quoted delimited text.
    Csv,
    /// Paginated PDF table.
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot.
    #[inline]
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    /// Media type of the rendered file.
    #[inline]
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Pdf => "application/pdf",
        }
    }

    /// Renders `report` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer fails.
    #[inline]
    pub fn render(self, report: &Report) -> Result<Vec<u8>> {
        match self {
            Self::Csv => render_csv(report),
            Self::Pdf => render_pdf(report),
        }
    }
}

impl fmt::Display for ExportFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// File name of an export generated on `date`:
/// `finance-export-<YYYY-MM-DD>.<ext>`.
#[inline]
#[must_use]
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("finance-export-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Lifecycle of the session's export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportState {
    /// Ready to accept an export.
    #[default]
    Idle,
    /// Pages are being fetched.
    Fetching,
    /// The report is being rendered and saved.
    Rendering,
    /// The last export was saved.
    Done {
        /// Where the file ended up.
        location: PathBuf,
    },
    /// The last export failed. Nothing was saved.
    Failed {
        /// User-facing error message.
        message: String,
    },
}

impl ExportState {
    /// Short lowercase name of the state.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Rendering => "rendering",
            Self::Done { .. } => "done",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns `true` while an export is running.
    #[inline]
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(*self, Self::Fetching | Self::Rendering)
    }
}

/// Runs exports from a ledger source into a file sink, one at a time.
///
/// Only [`ExportState::Idle`] accepts a new export. A finished or failed
/// export must be [acknowledged](Self::acknowledge) before the next one.
/// In-flight exports cannot be cancelled.
#[derive(Debug)]
pub struct ExportSession<S, K> {
    /// Where rows come from.
    source: S,
    /// Where files go.
    sink: K,
    /// Current state. Never held across an await point.
    state: Mutex<ExportState>,
}

impl<S: LedgerSource, K: FileSink> ExportSession<S, K> {
    /// Creates an idle session.
    #[inline]
    #[must_use]
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            state: Mutex::new(ExportState::Idle),
        }
    }

    /// Ledger source of the session.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// File sink of the session.
    #[inline]
    #[must_use]
    pub const fn sink(&self) -> &K {
        &self.sink
    }

    /// Snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned.
    #[inline]
    pub fn state(&self) -> Result<ExportState> {
        Ok(self.lock()?.clone())
    }

    /// Returns a settled session to idle and yields the settled state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ExportBusy`] while an export is running.
    #[inline]
    pub fn acknowledge(&self) -> Result<ExportState> {
        let mut state = self.lock()?;
        if state.is_busy() {
            return Err(LedgerError::ExportBusy { state: state.name() });
        }
        Ok(core::mem::take(&mut *state))
    }

    /// Exports every transaction matching `filters`, stamped with the
    /// current local time.
    ///
    /// # Errors
    ///
    /// See [`Self::export_at`].
    #[inline]
    pub async fn export_transactions(&self, filters: &FilterSet, format: ExportFormat) -> Result<PathBuf> {
        self.export_at(filters, format, Local::now().naive_local()).await
    }

    /// Exports every transaction matching `filters` as if generated at
    /// `generated_at`, and returns where the file was saved.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ExportBusy`] unless the session is idle.
    /// Otherwise any fetch, render or sink error is returned unchanged,
    /// the session moves to [`ExportState::Failed`] and no file is saved.
    #[tracing::instrument(skip_all, fields(format = %format))]
    pub async fn export_at(
        &self,
        filters: &FilterSet,
        format: ExportFormat,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf> {
        self.begin()?;
        match self.run(filters, format, generated_at).await {
            Ok(location) => {
                self.set(ExportState::Done {
                    location: location.clone(),
                })?;
                Ok(location)
            }
            Err(err) => {
                tracing::debug!(error = %err, "export failed");
                self.set(ExportState::Failed {
                    message: err.to_string(),
                })?;
                Err(err)
            }
        }
    }

    /// Fetches, renders and saves one export.
    async fn run(
        &self,
        filters: &FilterSet,
        format: ExportFormat,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf> {
        let rows = fetch_all(&self.source, filters).await?;
        self.set(ExportState::Rendering)?;
        let report = Report::new(rows, filters, generated_at)?;
        let file = ExportFile {
            name: export_file_name(format, generated_at.date()),
            media_type: format.media_type(),
            bytes: format.render(&report)?,
        };
        tracing::debug!(name = %file.name, bytes = file.bytes.len(), "rendered export");
        let location = self.sink.save(&file)?;
        tracing::info!(rows = report.rows.len(), file = %location.display(), "export saved");
        Ok(location)
    }

    /// Moves from idle to fetching.
    fn begin(&self) -> Result<()> {
        let mut state = self.lock()?;
        if *state != ExportState::Idle {
            return Err(LedgerError::ExportBusy { state: state.name() });
        }
        *state = ExportState::Fetching;
        Ok(())
    }

    /// Replaces the state.
    fn set(&self, next: ExportState) -> Result<()> {
        *self.lock()? = next;
        Ok(())
    }

    /// Locks the state.
    fn lock(&self) -> Result<MutexGuard<'_, ExportState>> {
        self.state.lock().map_err(|err| lock_error(&err))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &PoisonError<T>) -> LedgerError {
    LedgerError::Poisoned(err.to_string())
}
