//! Core data model types for loading.
//!
//! Every reader produces [`RowSet`]s: an ordered list of column names plus row-major cells.
//! Cells are untyped text ([`Value::Utf8`]) or absent ([`Value::Null`]); numeric/date typing is
//! left to whoever queries the destination tables.

use std::collections::HashMap;

/// A single cell in a [`RowSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// UTF-8 text, stored exactly as read.
    Utf8(String),
}

impl Value {
    /// Build a cell from raw text; empty text is treated as absent.
    pub fn from_text(raw: &str) -> Self {
        if raw.is_empty() {
            Value::Null
        } else {
            Value::Utf8(raw.to_owned())
        }
    }

    /// Borrow the text, or `None` for [`Value::Null`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Null => None,
            Value::Utf8(s) => Some(s.as_str()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// In-memory tabular data read from one file or one sheet.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as `columns`. Every row has exactly
/// `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSet {
    /// Ordered, unique column names.
    pub columns: Vec<String>,
    /// Row-major cell storage.
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    /// Create a row set from columns and rows.
    ///
    /// # Panics
    ///
    /// Panics if any row has a different length than `columns`.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        assert!(
            rows.iter().all(|r| r.len() == width),
            "every row must have {width} cells"
        );
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A row set with no rows or no columns carries nothing to write.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Returns the index of a column by exact name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Keep only the columns at `keep` (in the given order).
    pub fn select_columns(self, keep: &[usize]) -> Self {
        let columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Self { columns, rows }
    }
}

/// One named row set produced by the reader.
///
/// For workbooks `name` is the sheet name; for delimited text it is [`CSV_SHEET_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: RowSet,
}

/// Synthetic sheet key used for delimited-text files.
pub const CSV_SHEET_KEY: &str = "csv";

/// A slice of a [`RowSet`] sharing one discriminant value.
///
/// `key` is `None` when the row set had no discriminant column and was kept whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub key: Option<String>,
    pub rows: RowSet,
}

/// Make raw header cells usable as column names.
///
/// Blank names become `Unnamed: <index>` and repeated names get `.1`, `.2`, ... suffixes, so the
/// result is always unique.
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::new();

    for (idx, name) in raw.into_iter().enumerate() {
        let name = name.as_ref();
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_owned()
        };

        let mut candidate = base.clone();
        if seen.contains_key(&candidate) {
            let mut n = seen.get(&base).copied().unwrap_or(0);
            loop {
                n += 1;
                candidate = format!("{base}.{n}");
                if !seen.contains_key(&candidate) {
                    break;
                }
            }
            seen.insert(base, n);
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{RowSet, Value, normalize_headers};

    #[test]
    fn empty_text_is_null() {
        assert_eq!(Value::from_text(""), Value::Null);
        assert_eq!(Value::from_text(" "), Value::Utf8(" ".to_string()));
    }

    #[test]
    fn headers_are_made_unique() {
        let out = normalize_headers(["id", "", "id", "name", "id"]);
        assert_eq!(out, vec!["id", "Unnamed: 1", "id.1", "name", "id.2"]);
    }

    #[test]
    fn header_suffix_does_not_collide_with_existing_name() {
        let out = normalize_headers(["a.1", "a", "a"]);
        assert_eq!(out, vec!["a.1", "a", "a.2"]);
    }

    #[test]
    fn select_columns_projects_rows() {
        let rs = RowSet::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![
                Value::from_text("1"),
                Value::Null,
                Value::from_text("3"),
            ]],
        );
        let out = rs.select_columns(&[2, 0]);
        assert_eq!(out.columns, vec!["c", "a"]);
        assert_eq!(out.rows[0], vec![Value::from_text("3"), Value::from_text("1")]);
    }

    #[test]
    fn rowset_without_columns_is_empty() {
        let rs = RowSet::new(Vec::new(), vec![Vec::new()]);
        assert!(rs.is_empty());
    }
}
