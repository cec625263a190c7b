//! Column pruning for [`crate::types::RowSet`].

use crate::types::RowSet;

/// Returns `rowset` without the columns that hold no value in any row.
///
/// A row set without rows keeps nothing: every column is empty.
pub fn drop_empty_columns(rowset: RowSet) -> RowSet {
    let keep: Vec<usize> = (0..rowset.column_count())
        .filter(|&idx| rowset.rows.iter().any(|row| !row[idx].is_null()))
        .collect();

    if keep.len() == rowset.column_count() {
        return rowset;
    }
    rowset.select_columns(&keep)
}

#[cfg(test)]
mod tests {
    use super::drop_empty_columns;
    use crate::types::{RowSet, Value};

    fn sample() -> RowSet {
        RowSet::new(
            vec!["id".into(), "blank".into(), "name".into()],
            vec![
                vec![Value::from_text("1"), Value::Null, Value::from_text("a")],
                vec![Value::from_text("2"), Value::Null, Value::Null],
            ],
        )
    }

    #[test]
    fn drops_only_fully_empty_columns() {
        let out = drop_empty_columns(sample());
        assert_eq!(out.columns, vec!["id", "name"]);
        assert_eq!(
            out.rows,
            vec![
                vec![Value::from_text("1"), Value::from_text("a")],
                vec![Value::from_text("2"), Value::Null],
            ]
        );
    }

    #[test]
    fn untouched_when_nothing_is_empty() {
        let rs = RowSet::new(vec!["a".into()], vec![vec![Value::from_text("x")]]);
        assert_eq!(drop_empty_columns(rs.clone()), rs);
    }

    #[test]
    fn no_rows_means_no_columns() {
        let rs = RowSet::new(vec!["a".into(), "b".into()], Vec::new());
        assert!(drop_empty_columns(rs).columns.is_empty());
    }
}
