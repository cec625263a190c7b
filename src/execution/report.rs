use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Outcome of writing one destination table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub sheet: String,
    pub key: Option<String>,
    pub rows_written: usize,
    pub batches: usize,
    /// Set when the write failed; `rows_written` then counts the committed prefix.
    pub error: Option<String>,
}

impl TableReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A sheet left out because it failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSheetReport {
    pub sheet: String,
    pub reason: String,
}

/// Everything that happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Set when the file could not be read at all.
    pub error: Option<String>,
    pub skipped_sheets: Vec<SkippedSheetReport>,
    /// Malformed CSV lines dropped while reading.
    pub skipped_lines: usize,
    pub tables: Vec<TableReport>,
}

impl FileReport {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            error: None,
            skipped_sheets: Vec::new(),
            skipped_lines: 0,
            tables: Vec::new(),
        }
    }
}

/// Structured record of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub source_dir: PathBuf,
    pub files: Vec<FileReport>,
}

impl RunReport {
    /// Aggregate counters.
    pub fn summary(&self) -> RunSummary {
        let mut s = RunSummary {
            files: self.files.len(),
            ..RunSummary::default()
        };
        for file in &self.files {
            if file.error.is_some() {
                s.files_failed += 1;
            }
            s.sheets_skipped += file.skipped_sheets.len();
            s.lines_skipped += file.skipped_lines;
            for table in &file.tables {
                s.rows_written += table.rows_written;
                if table.succeeded() {
                    s.tables_written += 1;
                } else {
                    s.tables_failed += 1;
                }
            }
        }
        s
    }

    /// Every table report across all files, in processing order.
    pub fn tables(&self) -> impl Iterator<Item = &TableReport> {
        self.files.iter().flat_map(|f| f.tables.iter())
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Immutable run counters derived from a [`RunReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub files_failed: usize,
    pub sheets_skipped: usize,
    pub lines_skipped: usize,
    pub tables_written: usize,
    pub tables_failed: usize,
    pub rows_written: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files={} (failed {}), tables={} (failed {}), rows_written={}, sheets_skipped={}, lines_skipped={}",
            self.files,
            self.files_failed,
            self.tables_written,
            self.tables_failed,
            self.rows_written,
            self.sheets_skipped,
            self.lines_skipped
        )
    }
}
