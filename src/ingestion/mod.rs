//! Tabular file reading.
//!
//! Most callers should use [`read_tabular`] (from [`unified`]) which:
//!
//! - picks the reader by file extension (`.csv`, `.xlsx`, `.xls`)
//! - returns one [`crate::types::Sheet`] per workbook sheet, or a single `csv` sheet
//! - reports skipped sheets and skipped CSV lines as [`ReadIssue`]s instead of failing
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`excel`] (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod sniff;
pub mod unified;

pub use self::csv::{CsvOptions, CsvReadStats};
pub use unified::{ReadIssue, ReadOptions, TabularFormat, TabularRead, read_tabular};
