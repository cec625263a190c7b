#![cfg(feature = "duckdb")]

use std::path::Path;

use duckdb::{Connection, params_from_iter};
use tracing::debug;

use crate::naming::TableName;
use crate::types::Value;

use super::{Store, StoreResult, quote_ident};

/// Embedded DuckDB store (file-backed or in-memory).
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Open (or create) a database file; `None` opens an in-memory database.
    pub fn open(db_file: Option<&Path>) -> StoreResult<Self> {
        let conn = match db_file {
            Some(p) => Connection::open(p)?,
            None => Connection::open_in_memory()?,
        };
        Ok(Self { conn })
    }

    /// Borrow the underlying connection (for inspection in tests and tools).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DuckDbStore {
    fn execute_probe(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    fn append_batch(
        &mut self,
        table: &TableName,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<()> {
        let table_ident = quote_ident(table.as_str(), '"');
        let col_idents: Vec<String> = columns.iter().map(|c| quote_ident(c, '"')).collect();

        let create = format!(
            "CREATE TABLE IF NOT EXISTS {table_ident} ({})",
            col_idents
                .iter()
                .map(|c| format!("{c} VARCHAR"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let insert = format!(
            "INSERT INTO {table_ident} ({}) VALUES ({})",
            col_idents.join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let tx = self.conn.transaction()?;
        tx.execute_batch(&create)?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter().map(Value::as_text)))?;
            }
        }
        tx.commit()?;
        debug!(table = %table, rows = rows.len(), "appended batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DuckDbStore;
    use crate::naming::sanitize;
    use crate::store::Store;
    use crate::types::Value;

    #[test]
    fn creates_and_appends() {
        let mut store = DuckDbStore::open(None).unwrap();
        store.execute_probe().unwrap();
        let t = sanitize("orders_csv_a");
        let cols = vec!["codigo".to_string(), "amount".to_string()];
        let rows = vec![
            vec![Value::from_text("A"), Value::from_text("10")],
            vec![Value::from_text("A"), Value::Null],
        ];
        store.append_batch(&t, &cols, &rows).unwrap();
        store.append_batch(&t, &cols, &rows[..1]).unwrap();

        let n: i64 = store
            .connection()
            .query_row("SELECT count(*) FROM orders_csv_a", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 3);
    }
}
