use std::fs;
use std::path::Path;

use sheet_loader::LoadError;
use sheet_loader::execution::{Pipeline, PipelineOptions, WriteOptions};
use sheet_loader::ingestion::{ReadIssue, TabularRead};
use sheet_loader::naming::TableName;
use sheet_loader::store::{MemoryStore, Store, StoreError, StoreResult};
use sheet_loader::types::{RowSet, Sheet, Value};

fn v(s: &str) -> Value {
    Value::from_text(s)
}

fn copy_fixture(dir: &Path, name: &str) {
    fs::copy(Path::new("tests/fixtures").join(name), dir.join(name)).unwrap();
}

/// Memory store that rejects every batch for the listed tables, or refuses the probe.
#[derive(Default)]
struct FailingStore {
    inner: MemoryStore,
    reject: Vec<String>,
    unreachable: bool,
    attempts: Vec<String>,
}

impl Store for FailingStore {
    fn execute_probe(&mut self) -> StoreResult<()> {
        if self.unreachable {
            return Err(StoreError::Unavailable {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn append_batch(
        &mut self,
        table: &TableName,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<()> {
        self.attempts.push(table.to_string());
        if self.reject.iter().any(|t| t == table.as_str()) {
            return Err(StoreError::Rejected {
                table: table.to_string(),
                message: "duplicate key".to_string(),
            });
        }
        self.inner.append_batch(table, columns, rows)
    }
}

#[test]
fn orders_csv_is_split_by_code() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "orders.csv");

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap();

    assert_eq!(store.table_names(), vec!["orders_csv_a", "orders_csv_b"]);
    let a = store.table("orders_csv_a").unwrap();
    assert_eq!(a.columns, vec!["codigo", "amount"]);
    assert_eq!(a.rows, vec![vec![v("A"), v("10")], vec![v("A"), v("7")]]);
    let b = store.table("orders_csv_b").unwrap();
    assert_eq!(b.rows, vec![vec![v("B"), v("5")]]);

    let summary = report.summary();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.tables_written, 2);
    assert_eq!(summary.rows_written, 3);
}

#[test]
fn empty_columns_pruned_and_missing_codes_grouped() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "tabbed_codes.csv");

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap();

    let written: Vec<(&str, usize)> = report
        .tables()
        .map(|t| (t.table.as_str(), t.rows_written))
        .collect();
    assert_eq!(
        written,
        vec![
            ("tabbed_codes_csv_10", 2),
            ("tabbed_codes_csv_sem_codigo", 1),
            ("tabbed_codes_csv_20", 1),
        ]
    );

    let missing = store.table("tabbed_codes_csv_sem_codigo").unwrap();
    assert_eq!(missing.columns, vec!["Codigo", "produto"]);
    assert_eq!(missing.rows, vec![vec![Value::Null, v("lapis")]]);
}

#[test]
fn rows_are_appended_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "orders.csv");

    let mut store = MemoryStore::new();
    for _ in 0..2 {
        Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
            .run()
            .unwrap();
    }
    assert_eq!(store.table("orders_csv_a").unwrap().rows.len(), 4);
    assert_eq!(store.table("orders_csv_b").unwrap().rows.len(), 2);
}

#[test]
fn batches_respect_the_batch_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = String::from("id,value\n");
    for i in 0..12 {
        body.push_str(&format!("{i},x{i}\n"));
    }
    fs::write(dir.path().join("plain.csv"), body).unwrap();

    let mut options = PipelineOptions::new(dir.path());
    options.write = WriteOptions { batch_size: 5 };

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&mut store, options).run().unwrap();

    // No codigo column: one table per sheet.
    assert_eq!(store.table_names(), vec!["plain_csv"]);
    assert_eq!(store.table("plain_csv").unwrap().rows.len(), 12);
    assert_eq!(store.batches(), 3);
    assert_eq!(report.tables().next().unwrap().batches, 3);
}

#[test]
fn failing_table_does_not_block_the_others() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "orders.csv");

    let mut store = FailingStore {
        reject: vec!["orders_csv_a".to_string()],
        ..FailingStore::default()
    };
    let report = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap();

    assert_eq!(store.attempts, vec!["orders_csv_a", "orders_csv_b"]);
    assert!(store.inner.table("orders_csv_a").is_none());
    assert_eq!(store.inner.table("orders_csv_b").unwrap().rows.len(), 1);

    let summary = report.summary();
    assert_eq!(summary.tables_failed, 1);
    assert_eq!(summary.tables_written, 1);
    let failed = report.tables().find(|t| !t.succeeded()).unwrap();
    assert_eq!(failed.table, "orders_csv_a");
    assert!(failed.error.as_deref().unwrap().contains("duplicate key"));
}

#[test]
fn unreachable_store_aborts_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "orders.csv");

    let mut store = FailingStore {
        unreachable: true,
        ..FailingStore::default()
    };
    let err = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap_err();

    assert!(matches!(err, LoadError::StoreUnreachable(_)));
    assert!(err.is_precondition());
    assert!(store.attempts.is_empty());
}

#[test]
fn missing_source_dir_aborts() {
    let mut store = MemoryStore::new();
    let err = Pipeline::new(&mut store, PipelineOptions::new("tests/fixtures/no_such_dir"))
        .run()
        .unwrap_err();
    assert!(matches!(err, LoadError::SourceDirMissing { .. }));
}

#[test]
fn directory_without_recognized_files_aborts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("readme.txt"), "not a sheet").unwrap();
    fs::write(dir.path().join("data.json"), "{}").unwrap();

    let mut store = MemoryStore::new();
    let err = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap_err();
    assert!(matches!(err, LoadError::NoSourceFiles { .. }));
    assert!(store.table_names().is_empty());
}

#[test]
fn unreadable_workbook_is_reported_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_corrupt.xlsx"), b"definitely not a zip archive").unwrap();
    copy_fixture(dir.path(), "orders.csv");
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap();

    assert_eq!(report.files.len(), 2);
    assert!(report.files[0].error.is_some());
    assert!(report.files[0].tables.is_empty());
    assert!(report.files[1].error.is_none());
    assert_eq!(store.table_names(), vec!["orders_csv_a", "orders_csv_b"]);
    assert_eq!(report.summary().files_failed, 1);
}

#[test]
fn skipped_lines_are_counted_in_the_report() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "malformed_semicolon.csv");

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap();

    assert_eq!(report.files[0].skipped_lines, 2);
    assert_eq!(report.summary().lines_skipped, 2);
    assert_eq!(
        store.table("malformed_semicolon_csv").unwrap().rows.len(),
        3
    );
}

#[test]
fn report_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "orders.csv");

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let tables = json["files"][0]["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["table"], "orders_csv_a");
    assert_eq!(tables[0]["rows_written"], 2);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_does_not_block_the_run() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixture(dir.path(), "orders.csv");
    std::os::unix::fs::symlink(dir.path().join("gone.csv"), dir.path().join("stale.csv")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("notes.txt")).unwrap();

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&mut store, PipelineOptions::new(dir.path()))
        .run()
        .unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(store.table_names(), vec!["orders_csv_a", "orders_csv_b"]);
}

#[test]
fn skipped_sheet_is_reported_and_siblings_are_written() {
    let sheet = |name: &str, code: &str| Sheet {
        name: name.to_string(),
        rows: RowSet::new(
            vec!["codigo".to_string(), "qtd".to_string()],
            vec![vec![v(code), v("1")]],
        ),
    };
    let read = TabularRead {
        sheets: vec![sheet("Janeiro", "A"), sheet("Marco", "B")],
        issues: vec![ReadIssue::SheetSkipped {
            sheet: "Fevereiro".to_string(),
            reason: "malformed sheet xml".to_string(),
        }],
    };

    let mut store = MemoryStore::new();
    let mut pipeline = Pipeline::new(&mut store, PipelineOptions::new("unused"));
    let report = pipeline.process_read(Path::new("vendas.xlsx"), Ok(read));
    drop(pipeline);

    assert!(report.error.is_none());
    assert_eq!(report.skipped_sheets.len(), 1);
    assert_eq!(report.skipped_sheets[0].sheet, "Fevereiro");
    let tables: Vec<&str> = report.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(tables, vec!["vendas_janeiro_a", "vendas_marco_b"]);
    assert_eq!(store.table_names(), vec!["vendas_janeiro_a", "vendas_marco_b"]);
}
