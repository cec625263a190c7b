use std::collections::HashMap;

use sheet_loader::naming::{MAX_TABLE_NAME_LEN, sanitize, table_name_for};
use sheet_loader::processing::{PartitionOptions, drop_empty_columns, partition};
use sheet_loader::types::{RowSet, Value};

fn v(s: &str) -> Value {
    Value::from_text(s)
}

/// Deterministic pseudo-random row set: codes drawn from a small alphabet, some missing.
fn mixed_rowset(n: usize) -> RowSet {
    let codes = ["A", "B", "", "C", "A", ""];
    let rows = (0..n)
        .map(|i| {
            let code = codes[(i * 7 + i / 3) % codes.len()];
            vec![v(code), v(&i.to_string()), Value::Null]
        })
        .collect();
    RowSet::new(vec!["codigo".into(), "seq".into(), "empty".into()], rows)
}

fn row_multiset(rows: &[Vec<Value>]) -> HashMap<Vec<Value>, usize> {
    let mut out = HashMap::new();
    for row in rows {
        *out.entry(row.clone()).or_insert(0) += 1;
    }
    out
}

#[test]
fn partitions_are_a_lossless_cover() {
    let original = mixed_rowset(97);
    let pruned = drop_empty_columns(original.clone());
    let parts = partition(original, &PartitionOptions::default());

    let rejoined: Vec<Vec<Value>> = parts.iter().flat_map(|p| p.rows.rows.clone()).collect();
    assert_eq!(rejoined.len(), pruned.row_count());
    assert_eq!(row_multiset(&rejoined), row_multiset(&pruned.rows));
    for p in &parts {
        assert_eq!(p.rows.columns, pruned.columns);
    }
}

#[test]
fn group_order_is_first_occurrence_and_rows_keep_order() {
    let parts = partition(mixed_rowset(50), &PartitionOptions::default());

    let source = mixed_rowset(50);
    let mut first_seen: Vec<String> = Vec::new();
    for row in &source.rows {
        let key = row[0].as_text().unwrap_or("sem_codigo").to_string();
        if !first_seen.contains(&key) {
            first_seen.push(key);
        }
    }
    let keys: Vec<String> = parts.iter().filter_map(|p| p.key.clone()).collect();
    assert_eq!(keys, first_seen);

    for p in &parts {
        let seqs: Vec<usize> = p
            .rows
            .rows
            .iter()
            .map(|r| r[1].as_text().unwrap().parse().unwrap())
            .collect();
        assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn missing_codes_form_exactly_one_group() {
    let parts = partition(mixed_rowset(60), &PartitionOptions::default());
    let sentinel: Vec<_> = parts
        .iter()
        .filter(|p| p.key.as_deref() == Some("sem_codigo"))
        .collect();
    assert_eq!(sentinel.len(), 1);
    assert!(sentinel[0].rows.rows.iter().all(|r| r[0].is_null()));
}

#[test]
fn orders_example_yields_two_tables() {
    let rs = RowSet::new(
        vec!["codigo".into(), "amount".into()],
        vec![
            vec![v("A"), v("10")],
            vec![v("B"), v("5")],
            vec![v("A"), v("7")],
        ],
    );
    let named: Vec<(String, Vec<Value>)> = partition(rs, &PartitionOptions::default())
        .into_iter()
        .map(|p| {
            let table = table_name_for("orders", "csv", p.key.as_deref()).into_string();
            let amounts = p.rows.rows.iter().map(|r| r[1].clone()).collect();
            (table, amounts)
        })
        .collect();

    assert_eq!(
        named,
        vec![
            ("orders_csv_a".to_string(), vec![v("10"), v("7")]),
            ("orders_csv_b".to_string(), vec![v("5")]),
        ]
    );
}

#[test]
fn sanitize_is_idempotent_and_well_formed() {
    let long = "x".repeat(200);
    let accented = format!("1{}", "é".repeat(80));
    let inputs = [
        "",
        " ",
        "2024 Sales!",
        "Planilha Geral_Aba 1_XPTO-9",
        "ÇÃÕ ümlaut",
        "___",
        "9lives",
        "already_clean",
        "tab\tand\nnewline",
        long.as_str(),
        accented.as_str(),
    ];
    for raw in inputs {
        let once = sanitize(raw);
        let s = once.as_str();
        assert!(!s.is_empty(), "{raw:?}");
        assert!(s.len() <= MAX_TABLE_NAME_LEN, "{raw:?}");
        assert!(
            s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'),
            "{raw:?} -> {s}"
        );
        assert!(!s.starts_with(|c: char| c.is_ascii_digit()), "{raw:?}");
        assert_eq!(sanitize(s), once, "not idempotent for {raw:?}");
    }
}

#[test]
fn distinct_sources_can_collide() {
    // Documented limitation: collisions are not disambiguated.
    assert_eq!(sanitize("Sales 2024"), sanitize("sales-2024"));
}
