//! Relational store boundary.
//!
//! The loader needs exactly two things from a store:
//!
//! - [`Store::execute_probe`]: a liveness check run once before anything is read
//! - [`Store::append_batch`]: create the table if absent (every column variable-length text) and
//!   append one batch of rows
//!
//! Batching itself lives in [`crate::execution::write_table`]; a backend sees one bounded batch
//! per call and should make that call atomic if it can.
//!
//! Backends:
//! - [`MemoryStore`]: in-process tables (tests, dry runs)
//! - [`MySqlStore`] (feature `mysql`)
//! - [`DuckDbStore`] (feature `duckdb`)

#[cfg(feature = "duckdb")]
mod duck;
mod memory;
#[cfg(feature = "mysql")]
mod mysql;

use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::LoadResult;
use crate::naming::TableName;
use crate::types::Value;

#[cfg(feature = "duckdb")]
pub use duck::DuckDbStore;
pub use memory::{MemoryStore, MemoryTable};
#[cfg(feature = "mysql")]
pub use mysql::MySqlStore;

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type returned by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "mysql")]
    /// MySQL driver error (connection, constraint, syntax...).
    #[error("mysql error: {0}")]
    MySql(#[from] sqlx::Error),

    #[cfg(feature = "duckdb")]
    /// DuckDB error.
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Failed to start the runtime a backend drives its driver with.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// The batch does not fit the existing table.
    #[error("table '{table}' rejected batch: {message}")]
    Rejected { table: String, message: String },

    /// The store is not reachable.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// A destination for row batches.
pub trait Store {
    /// Cheap round-trip proving the store is reachable.
    fn execute_probe(&mut self) -> StoreResult<()>;

    /// Create `table` if it does not exist, then append `rows` under `columns`.
    ///
    /// Never replaces or truncates existing contents.
    fn append_batch(
        &mut self,
        table: &TableName,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<()>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn execute_probe(&mut self) -> StoreResult<()> {
        (**self).execute_probe()
    }

    fn append_batch(
        &mut self,
        table: &TableName,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<()> {
        (**self).append_batch(table, columns, rows)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn execute_probe(&mut self) -> StoreResult<()> {
        (**self).execute_probe()
    }

    fn append_batch(
        &mut self,
        table: &TableName,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<()> {
        (**self).append_batch(table, columns, rows)
    }
}

/// Open the backend selected by `config`.
///
/// Opening does not touch the network; reachability is checked by [`Store::execute_probe`] at
/// the start of a run.
pub fn open_store(config: &StoreConfig) -> LoadResult<Box<dyn Store>> {
    match config.backend {
        StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
        StoreBackend::Mysql => open_mysql(config),
        StoreBackend::Duckdb => open_duckdb(config),
    }
}

#[cfg(feature = "mysql")]
fn open_mysql(config: &StoreConfig) -> LoadResult<Box<dyn Store>> {
    use sqlx::mysql::MySqlConnectOptions;

    let mut options = MySqlConnectOptions::new()
        .host(config.host.as_deref().unwrap_or("localhost"))
        .port(config.port);
    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }
    tracing::info!(url = %config.redacted_url(), "using mysql store");
    Ok(Box::new(MySqlStore::connect_with(options, &config.charset)?))
}

#[cfg(not(feature = "mysql"))]
fn open_mysql(_config: &StoreConfig) -> LoadResult<Box<dyn Store>> {
    Err(crate::error::LoadError::Config {
        message: "mysql backend not enabled (enable cargo feature 'mysql')".to_string(),
    })
}

#[cfg(feature = "duckdb")]
fn open_duckdb(config: &StoreConfig) -> LoadResult<Box<dyn Store>> {
    tracing::info!(path = ?config.duckdb_path, "using duckdb store");
    Ok(Box::new(DuckDbStore::open(config.duckdb_path.as_deref())?))
}

#[cfg(not(feature = "duckdb"))]
fn open_duckdb(_config: &StoreConfig) -> LoadResult<Box<dyn Store>> {
    Err(crate::error::LoadError::Config {
        message: "duckdb backend not enabled (enable cargo feature 'duckdb')".to_string(),
    })
}

/// Quote an identifier by wrapping it in `quote` and doubling embedded quotes.
pub(crate) fn quote_ident(name: &str, quote: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}
