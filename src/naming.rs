//! Destination table naming.
//!
//! [`sanitize`] turns any free text into a [`TableName`]: lower-case `[a-z0-9_]`, never starting
//! with a digit, at most [`MAX_TABLE_NAME_LEN`] characters.
//!
//! Distinct inputs can sanitize to the same name (`"Sales 2024"` and `"sales-2024"` both become
//! `sales_2024`). Collisions are not detected here; two sources mapping to one name append into
//! the same table.

use std::fmt;

/// Identifier length limit of the destination store (MySQL).
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Prefix added to names that would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "t_";

/// A sanitized destination table identifier.
///
/// Only [`sanitize`] constructs one, so the value always matches `^[a-z0-9_]{1,64}$` with no
/// leading digit and can be quoted into SQL without further escaping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sanitize free text into a table identifier.
///
/// Trims, lower-cases, replaces every character outside `[a-z0-9_]` with `_`, prefixes
/// [`DIGIT_PREFIX`] when the result starts with a digit and truncates to
/// [`MAX_TABLE_NAME_LEN`]. Input that is empty after trimming yields `_`.
pub fn sanitize(raw: &str) -> TableName {
    let mut name: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            _ => '_',
        })
        .collect();

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, DIGIT_PREFIX);
    }
    // Only ASCII remains, so byte length == char count.
    name.truncate(MAX_TABLE_NAME_LEN);

    if name.is_empty() {
        name.push('_');
    }
    TableName(name)
}

/// Derive the destination table for one file/sheet/partition combination.
///
/// The raw name is `{base}_{sheet}_{key}`, or `{base}_{sheet}` when the row set was not
/// partitioned.
pub fn table_name_for(base: &str, sheet: &str, key: Option<&str>) -> TableName {
    let raw = match key {
        Some(key) => format!("{base}_{sheet}_{key}"),
        None => format!("{base}_{sheet}"),
    };
    sanitize(&raw)
}
