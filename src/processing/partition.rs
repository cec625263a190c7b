//! Partition-by-value for [`crate::types::RowSet`].

use std::collections::HashMap;

use crate::types::{Partition, RowSet, Value};

use super::prune::drop_empty_columns;

/// Column whose values split a row set into separate tables.
pub const DEFAULT_DISCRIMINANT: &str = "codigo";

/// Key used for rows whose discriminant cell is absent ("no code").
pub const DEFAULT_MISSING_KEY: &str = "sem_codigo";

/// Options for [`partition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionOptions {
    /// Discriminant column name, compared trimmed and case-insensitively.
    pub discriminant: String,
    /// Key assigned to rows with an absent discriminant value.
    pub missing_key: String,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            discriminant: DEFAULT_DISCRIMINANT.to_string(),
            missing_key: DEFAULT_MISSING_KEY.to_string(),
        }
    }
}

/// Index of the first column whose trimmed, lower-cased name equals `discriminant`.
pub fn find_discriminant(columns: &[String], discriminant: &str) -> Option<usize> {
    let wanted = discriminant.trim().to_lowercase();
    columns
        .iter()
        .position(|c| c.trim().to_lowercase() == wanted)
}

/// Split `rowset` into one [`Partition`] per distinct discriminant value.
///
/// Fully empty columns are dropped first. Without a discriminant column the whole (pruned) row
/// set is returned as a single partition with `key = None`. Otherwise groups are emitted in
/// order of first occurrence, rows keep their relative order within a group, and the
/// discriminant column stays in every output row set.
pub fn partition(rowset: RowSet, options: &PartitionOptions) -> Vec<Partition> {
    let rowset = drop_empty_columns(rowset);

    let Some(idx) = find_discriminant(&rowset.columns, &options.discriminant) else {
        return vec![Partition {
            key: None,
            rows: rowset,
        }];
    };

    let RowSet { columns, rows } = rowset;
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Vec<Value>>)> = Vec::new();

    for row in rows {
        let key = match &row[idx] {
            Value::Utf8(s) => s.clone(),
            Value::Null => options.missing_key.clone(),
        };
        match slots.get(&key) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, rows)| Partition {
            key: Some(key),
            rows: RowSet::new(columns.clone(), rows),
        })
        .collect()
}
