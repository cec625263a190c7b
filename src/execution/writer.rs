use std::ops::Range;

use tracing::debug;

use crate::naming::TableName;
use crate::store::{Store, StoreError};
use crate::types::RowSet;

/// Default number of rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5_000;

/// Options for [`write_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Maximum rows per `append_batch` call. Zero is treated as one.
    pub batch_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Result of writing one row set to one table.
#[derive(Debug)]
pub enum WriteOutcome {
    /// Every row was appended.
    Written { rows: usize, batches: usize },
    /// Nothing to write (no rows or no columns); the store was not touched.
    Skipped,
    /// A batch failed. Earlier batches stay committed: `rows_written` counts them.
    Failed {
        rows_written: usize,
        batches: usize,
        error: StoreError,
    },
}

impl WriteOutcome {
    pub fn rows_written(&self) -> usize {
        match self {
            WriteOutcome::Written { rows, .. } => *rows,
            WriteOutcome::Skipped => 0,
            WriteOutcome::Failed { rows_written, .. } => *rows_written,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, WriteOutcome::Failed { .. })
    }
}

/// Append `rowset` to `table` in batches of at most `options.batch_size` rows.
///
/// Always append: existing rows are never replaced. A failing batch stops this table only; the
/// error is returned in [`WriteOutcome::Failed`] rather than propagated, so the caller can go on
/// with other tables.
pub fn write_table<S>(
    store: &mut S,
    rowset: &RowSet,
    table: &TableName,
    options: &WriteOptions,
) -> WriteOutcome
where
    S: Store + ?Sized,
{
    if rowset.is_empty() {
        return WriteOutcome::Skipped;
    }

    let mut rows_written = 0usize;
    let mut batches = 0usize;
    for range in chunk_ranges(rowset.row_count(), options.batch_size.max(1)) {
        let len = range.len();
        if let Err(error) = store.append_batch(table, &rowset.columns, &rowset.rows[range]) {
            return WriteOutcome::Failed {
                rows_written,
                batches,
                error,
            };
        }
        rows_written += len;
        batches += 1;
        debug!(table = %table, rows_written, batches, "batch appended");
    }

    WriteOutcome::Written {
        rows: rows_written,
        batches,
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    if row_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(row_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < row_count {
        let end = (start + chunk_size).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}
