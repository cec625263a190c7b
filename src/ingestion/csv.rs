//! Tolerant CSV reading.
//!
//! Rules:
//!
//! - The first record is the header (blank/duplicate names are normalized).
//! - The delimiter is sniffed unless [`CsvOptions::delimiter`] forces one.
//! - Every field is kept as text; empty fields become [`Value::Null`].
//! - Records with the wrong field count or invalid UTF-8 are skipped, and the number of skipped
//!   lines is reported in [`CsvReadStats`].

use std::path::Path;

use csv::{ByteRecord, ErrorKind};
use tracing::debug;

use crate::error::LoadResult;
use crate::types::{RowSet, Value, normalize_headers};

use super::sniff::{DEFAULT_SNIFF_RECORDS, sniff_delimiter};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Options for delimited-text reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Force a field delimiter; `None` sniffs it from the file.
    pub delimiter: Option<u8>,
    /// Quote character (default: double quote).
    pub quote: u8,
    /// Records inspected when sniffing the delimiter.
    pub sniff_records: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            sniff_records: DEFAULT_SNIFF_RECORDS,
        }
    }
}

/// Line accounting for one CSV read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvReadStats {
    /// Physical lines in the input, counted independently of parsing.
    pub total_lines: usize,
    /// Data rows kept.
    pub parsed_rows: usize,
    /// `total_lines - parsed_rows - 1` (the header), floored at zero.
    ///
    /// Lines are physical lines, so a quoted field spanning several lines adds to this count
    /// even though no row was lost. Treat it as an upper bound on dropped records.
    pub skipped_lines: usize,
    /// Delimiter actually used.
    pub delimiter: u8,
}

/// Read a CSV file into a [`RowSet`].
pub fn read_csv_from_path(
    path: impl AsRef<Path>,
    options: &CsvOptions,
) -> LoadResult<(RowSet, CsvReadStats)> {
    let bytes = std::fs::read(path)?;
    read_csv_from_bytes(&bytes, options)
}

/// Read CSV data already held in memory.
pub fn read_csv_from_bytes(
    bytes: &[u8],
    options: &CsvOptions,
) -> LoadResult<(RowSet, CsvReadStats)> {
    let total_lines = count_lines(bytes);
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let delimiter = options
        .delimiter
        .or_else(|| sniff_delimiter(body, options.sniff_records))
        .unwrap_or(b',');
    debug!(delimiter = %char::from(delimiter).escape_default(), total_lines, "reading csv");

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(options.quote)
        .has_headers(true)
        .flexible(false)
        .from_reader(body);

    let headers = rdr.byte_headers()?.clone();
    let columns = normalize_headers(headers.iter().map(|h| String::from_utf8_lossy(h)));

    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut record = ByteRecord::new();
    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(true) => {
                if let Some(row) = decode_record(&record) {
                    rows.push(row);
                }
            }
            Ok(false) => break,
            Err(e) if matches!(e.kind(), ErrorKind::UnequalLengths { .. }) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let parsed_rows = rows.len();
    let stats = CsvReadStats {
        total_lines,
        parsed_rows,
        skipped_lines: total_lines.saturating_sub(parsed_rows + 1),
        delimiter,
    };

    // A header-only or empty file may have no columns at all.
    let rows = if columns.is_empty() { Vec::new() } else { rows };
    Ok((RowSet::new(columns, rows), stats))
}

/// Decode every field as UTF-8; `None` if any field is not valid UTF-8.
fn decode_record(record: &ByteRecord) -> Option<Vec<Value>> {
    record
        .iter()
        .map(|field| std::str::from_utf8(field).ok().map(Value::from_text))
        .collect()
}

/// Count physical lines the way a line-oriented reader would: every `\n` ends a line, plus a
/// final unterminated line if present.
fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}
