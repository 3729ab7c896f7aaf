//! Destinations for rendered exports.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::{LedgerError, Result};

/// A rendered export ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name, e.g. `finance-export-2024-02-01.csv`.
    pub name: String,
    /// Media type, e.g. `text/csv`.
    pub media_type: &'static str,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Saves rendered exports somewhere the user can reach them.
pub trait FileSink: core::fmt::Debug + Send + Sync {
    /// Saves `file` and returns where it ended up.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be stored.
    fn save(&self, file: &ExportFile) -> Result<PathBuf>;
}

/// Writes exports into a directory.
///
/// Files are written to a `.part` sibling first and renamed into place, so
/// a failed write never leaves a truncated export behind.
#[cfg(feature = "sink-file")]
#[derive(Debug, Clone)]
pub struct DirectorySink {
    /// Target directory.
    dir: PathBuf,
}

#[cfg(feature = "sink-file")]
impl DirectorySink {
    /// Creates a sink writing into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] if the directory cannot be created.
    #[inline]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "export directory ready");
        Ok(Self { dir })
    }

    /// Default export directory: the user's downloads folder, then the
    /// home directory, then the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Sink`] if none of them can be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .map_or_else(
                || std::env::current_dir().map_err(|err| LedgerError::Sink(err.to_string())),
                Ok,
            )
    }

    /// Target directory.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(feature = "sink-file")]
impl FileSink for DirectorySink {
    fn save(&self, file: &ExportFile) -> Result<PathBuf> {
        let name = std::path::Path::new(&file.name)
            .file_name()
            .ok_or_else(|| LedgerError::Sink(format!("invalid file name: {:?}", file.name)))?;
        let path = self.dir.join(name);
        let mut partial = path.clone().into_os_string();
        partial.push(".part");
        std::fs::write(&partial, &file.bytes)?;
        std::fs::rename(&partial, &path)?;
        tracing::debug!(path = %path.display(), bytes = file.bytes.len(), "export saved");
        Ok(path)
    }
}

/// Keeps exports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Saved files in order.
    files: Mutex<Vec<ExportFile>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files saved so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    #[inline]
    pub fn files(&self) -> Result<Vec<ExportFile>> {
        Ok(self.files.lock().map_err(|err| lock_error(&err))?.clone())
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &PoisonError<T>) -> LedgerError {
    LedgerError::Poisoned(err.to_string())
}

impl FileSink for MemorySink {
    fn save(&self, file: &ExportFile) -> Result<PathBuf> {
        self.files
            .lock()
            .map_err(|err| lock_error(&err))?
            .push(file.clone());
        Ok(PathBuf::from(&file.name))
    }
}
