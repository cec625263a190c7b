//! Unified reading entrypoint.
//!
//! [`read_tabular`] dispatches on the file extension (case-insensitive) and returns every named
//! [`RowSet`](crate::types::RowSet) found in the file, plus the non-fatal issues met on the way.
//!
//! - `.xlsx` / `.xls`: one [`Sheet`] per parseable workbook sheet
//! - `.csv`: a single [`Sheet`] named [`CSV_SHEET_KEY`]
//! - anything else: nothing (not an error)

use std::path::Path;

use crate::error::LoadResult;
use crate::types::{CSV_SHEET_KEY, Sheet};

use super::csv::{self, CsvOptions};

/// Recognized tabular formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TabularFormat {
    /// Delimited text.
    Csv,
    /// Spreadsheet workbook (feature-gated behind `excel`).
    Workbook,
}

impl TabularFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Workbook),
            _ => None,
        }
    }

    /// Infer the format of `path`, if it has a recognized extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// Non-fatal problems met while reading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadIssue {
    /// A workbook sheet failed to parse and was left out.
    SheetSkipped { sheet: String, reason: String },
    /// Malformed CSV lines were dropped.
    LinesSkipped { skipped: usize, total_lines: usize },
}

/// Result of reading one file.
#[derive(Debug, Clone, Default)]
pub struct TabularRead {
    /// Named row sets, in file order.
    pub sheets: Vec<Sheet>,
    /// Diagnostics; never fatal.
    pub issues: Vec<ReadIssue>,
}

/// Options controlling how files are read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Delimited-text options.
    pub csv: CsvOptions,
}

/// Read `path` into named row sets.
///
/// Returns `Err` only when the file cannot be opened or is corrupt at the container level; the
/// caller treats that as a failure of this one file.
pub fn read_tabular(path: impl AsRef<Path>, options: &ReadOptions) -> LoadResult<TabularRead> {
    let path = path.as_ref();
    match TabularFormat::from_path(path) {
        Some(TabularFormat::Csv) => read_csv_dispatch(path, &options.csv),
        Some(TabularFormat::Workbook) => read_workbook_dispatch(path),
        None => Ok(TabularRead::default()),
    }
}

fn read_csv_dispatch(path: &Path, options: &CsvOptions) -> LoadResult<TabularRead> {
    let (rows, stats) = csv::read_csv_from_path(path, options)?;

    let mut out = TabularRead::default();
    if stats.skipped_lines > 0 {
        out.issues.push(ReadIssue::LinesSkipped {
            skipped: stats.skipped_lines,
            total_lines: stats.total_lines,
        });
    }
    out.sheets.push(Sheet {
        name: CSV_SHEET_KEY.to_string(),
        rows,
    });
    Ok(out)
}

fn read_workbook_dispatch(path: &Path) -> LoadResult<TabularRead> {
    #[cfg(feature = "excel")]
    {
        let wb = super::excel::read_workbook_from_path(path)?;
        let issues = wb
            .skipped
            .into_iter()
            .map(|s| ReadIssue::SheetSkipped {
                sheet: s.sheet,
                reason: s.reason,
            })
            .collect();
        Ok(TabularRead {
            sheets: wb.sheets,
            issues,
        })
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(crate::error::LoadError::UnsupportedFormat {
            message: format!(
                "workbook reading not enabled (enable cargo feature 'excel'): {}",
                path.display()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{ReadOptions, TabularFormat, read_tabular};

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(TabularFormat::from_extension("CSV"), Some(TabularFormat::Csv));
        assert_eq!(TabularFormat::from_extension("Xlsx"), Some(TabularFormat::Workbook));
        assert_eq!(TabularFormat::from_extension("XLS"), Some(TabularFormat::Workbook));
        assert_eq!(TabularFormat::from_extension("ods"), None);
        assert_eq!(TabularFormat::from_path(Path::new("notes")), None);
    }

    #[test]
    fn unknown_extension_reads_nothing() {
        // The file does not even need to exist.
        let out = read_tabular("does/not/exist.txt", &ReadOptions::default()).unwrap();
        assert!(out.sheets.is_empty());
        assert!(out.issues.is_empty());
    }
}
