//! In-memory row set transformations applied between reading and writing.
//!
//! Everything here is pure: no store access, so it can be tested with plain data.
//!
//! - [`drop_empty_columns()`]: remove columns with no value in any row
//! - [`partition()`]: split a row set by the distinct values of the discriminant column
//!
//! ## Example
//!
//! ```rust
//! use sheet_loader::processing::{partition, PartitionOptions};
//! use sheet_loader::types::{RowSet, Value};
//!
//! let rows = RowSet::new(
//!     vec!["codigo".to_string(), "amount".to_string()],
//!     vec![
//!         vec![Value::from_text("A"), Value::from_text("10")],
//!         vec![Value::from_text("B"), Value::from_text("5")],
//!         vec![Value::from_text("A"), Value::from_text("7")],
//!     ],
//! );
//!
//! let parts = partition(rows, &PartitionOptions::default());
//! let keys: Vec<_> = parts.iter().map(|p| p.key.as_deref()).collect();
//! assert_eq!(keys, vec![Some("A"), Some("B")]);
//! assert_eq!(parts[0].rows.row_count(), 2);
//! ```

pub mod partition;
pub mod prune;

pub use partition::{
    DEFAULT_DISCRIMINANT, DEFAULT_MISSING_KEY, PartitionOptions, find_discriminant, partition,
};
pub use prune::drop_empty_columns;
