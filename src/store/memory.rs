use std::collections::BTreeMap;

use tracing::debug;

use crate::naming::TableName;
use crate::types::Value;

use super::{Store, StoreError, StoreResult};

/// One in-memory table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// In-process store.
///
/// Behaves like a relational store with append semantics: the first batch fixes a table's
/// columns; later batches must use a subset of them (missing columns are filled with
/// [`Value::Null`]), otherwise the batch is rejected.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, MemoryTable>,
    batches: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Number of `append_batch` calls accepted so far.
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl Store for MemoryStore {
    fn execute_probe(&mut self) -> StoreResult<()> {
        Ok(())
    }

    fn append_batch(
        &mut self,
        table: &TableName,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<()> {
        let entry = self
            .tables
            .entry(table.as_str().to_string())
            .or_insert_with(|| {
                debug!(table = %table, columns = columns.len(), "creating table");
                MemoryTable {
                    columns: columns.to_vec(),
                    rows: Vec::new(),
                }
            });

        let mut projection = Vec::with_capacity(columns.len());
        for c in columns {
            match entry.columns.iter().position(|existing| existing == c) {
                Some(idx) => projection.push(idx),
                None => {
                    return Err(StoreError::Rejected {
                        table: table.to_string(),
                        message: format!("unknown column '{c}'"),
                    });
                }
            }
        }

        let width = entry.columns.len();
        for row in rows {
            let mut stored = vec![Value::Null; width];
            for (value, &idx) in row.iter().zip(&projection) {
                stored[idx] = value.clone();
            }
            entry.rows.push(stored);
        }
        self.batches += 1;
        Ok(())
    }
}
