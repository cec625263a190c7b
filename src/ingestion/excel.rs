#![cfg(feature = "excel")]

use std::fmt;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::{debug, warn};

use crate::error::LoadResult;
use crate::types::{RowSet, Sheet, Value, normalize_headers};

/// A sheet that could not be parsed and was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSheet {
    pub sheet: String,
    pub reason: String,
}

/// Every sheet of a workbook that parsed, plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct WorkbookRead {
    pub sheets: Vec<Sheet>,
    pub skipped: Vec<SkippedSheet>,
}

/// Read every sheet of a workbook (`.xlsx`, `.xls`) into [`RowSet`]s, in workbook order.
///
/// Behavior:
/// - Failing to open the workbook is an error for the whole file
/// - A sheet that fails to parse is recorded in [`WorkbookRead::skipped`]; the others still load
/// - The first non-empty row of a sheet is its header
/// - Cells become text; fully empty data rows are dropped
pub fn read_workbook_from_path(path: impl AsRef<Path>) -> LoadResult<WorkbookRead> {
    let mut workbook = open_workbook_auto(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();
    let ranges = names.into_iter().map(|name| {
        let range = workbook.worksheet_range(&name);
        (name, range)
    });
    Ok(collect_sheets(ranges))
}

/// Turn per-sheet parse results into a [`WorkbookRead`], keeping sheet order. A failed sheet is
/// recorded with its error text and does not affect its siblings.
pub fn collect_sheets<I, E>(ranges: I) -> WorkbookRead
where
    I: IntoIterator<Item = (String, Result<Range<Data>, E>)>,
    E: fmt::Display,
{
    let mut out = WorkbookRead::default();
    for (name, range) in ranges {
        match range {
            Ok(range) => {
                let rows = sheet_rowset(&range);
                debug!(sheet = %name, rows = rows.row_count(), "read sheet");
                out.sheets.push(Sheet { name, rows });
            }
            Err(e) => {
                warn!(sheet = %name, error = %e, "skipping sheet");
                out.skipped.push(SkippedSheet {
                    sheet: name,
                    reason: e.to_string(),
                });
            }
        }
    }
    out
}

/// Convert a sheet range into a [`RowSet`]. A range without any non-empty row is empty.
pub fn sheet_rowset(range: &Range<Data>) -> RowSet {
    let mut rows_iter = range.rows().skip_while(|row| is_blank_row(row));

    let Some(header_row) = rows_iter.next() else {
        return RowSet::default();
    };
    let columns = normalize_headers(header_row.iter().map(cell_to_header_string));
    let width = columns.len();

    let rows = rows_iter
        .filter(|row| !is_blank_row(row))
        .map(|row| {
            let mut out: Vec<Value> = row.iter().take(width).map(cell_to_value).collect();
            out.resize(width, Value::Null);
            out
        })
        .collect();

    RowSet::new(columns, rows)
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|c| matches!(c, Data::Empty))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::Empty | Data::Error(_) => String::new(),
        other => cell_text(other),
    }
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        other => Value::from_text(&cell_text(other)),
    }
}

fn cell_text(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => ndt.to_string(),
            None => dt.to_string(),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}
