use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Convenience result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error type returned by reader, pipeline and configuration functions.
///
/// Per-sheet, per-line and per-table failures are reported and isolated rather than returned;
/// what surfaces here is either a per-file read failure or a run-level precondition failure.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook could not be opened or parsed (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV reading error that is not a per-line malformation.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Directory walk error while listing source files.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A format was recognized but its support is compiled out.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },

    /// The store did not answer the liveness probe; the run is aborted.
    #[error("store unreachable: {0}")]
    StoreUnreachable(#[source] StoreError),

    /// Store backend error outside of a table write (e.g. while connecting).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The configured source directory does not exist or is not a directory.
    #[error("source directory not found: {}", path.display())]
    SourceDirMissing { path: PathBuf },

    /// The source directory holds no file with a recognized extension.
    #[error("no .xlsx/.xls/.csv files found in {}", path.display())]
    NoSourceFiles { path: PathBuf },

    /// Invalid or incomplete configuration.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl LoadError {
    /// True for failures that abort the whole run before any write.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LoadError::StoreUnreachable(_)
                | LoadError::SourceDirMissing { .. }
                | LoadError::NoSourceFiles { .. }
        )
    }
}
