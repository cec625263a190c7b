//! `sheet-loader` bulk-loads a directory of spreadsheet workbooks and delimited text files into
//! a relational store.
//!
//! Every file is read into one [`types::RowSet`] per sheet (or a single `csv` row set), fully
//! empty columns are dropped, and when a `codigo` column is present the rows are split into one
//! destination table per distinct code. Table names are derived from
//! `{file}_{sheet}[_{code}]` and sanitized into safe identifiers. Rows are appended in batches;
//! a failure only costs the file, sheet or table it happened in.
//!
//! ## What gets read
//!
//! - **Workbooks** (Cargo feature `excel`, on by default): `.xlsx`, `.xls`, every sheet
//! - **Delimited text**: `.csv`, delimiter auto-detected, malformed lines skipped and counted
//!
//! Every cell is kept as text ([`types::Value::Utf8`]) or absent ([`types::Value::Null`]); no
//! numeric or date typing is attempted.
//!
//! ## Quick example: load a directory into memory
//!
//! ```no_run
//! use sheet_loader::execution::{Pipeline, PipelineOptions};
//! use sheet_loader::store::MemoryStore;
//!
//! # fn main() -> Result<(), sheet_loader::LoadError> {
//! let mut store = MemoryStore::new();
//! let report = Pipeline::new(&mut store, PipelineOptions::new("./planilhas")).run()?;
//! println!("{}", report.summary());
//! for name in store.table_names() {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Naming
//!
//! ```rust
//! use sheet_loader::naming::{sanitize, table_name_for};
//!
//! assert_eq!(sanitize("2024 Sales!").as_str(), "t_2024_sales_");
//! assert_eq!(table_name_for("orders", "csv", Some("A")).as_str(), "orders_csv_a");
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: file-format dispatch, tolerant CSV and workbook readers
//! - [`processing`]: column pruning and partition-by-value
//! - [`naming`]: table identifier sanitization
//! - [`store`]: the store boundary and its backends
//! - [`execution`]: table writer, run orchestration, observers and run reports
//! - [`config`] / [`cli`]: configuration and the `sheet-loader` binary
//! - [`error`]: error types

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod naming;
pub mod processing;
pub mod store;
pub mod types;

pub use error::{LoadError, LoadResult};
