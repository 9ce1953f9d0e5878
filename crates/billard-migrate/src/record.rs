//! In-memory rows read from one table.

use crate::store::SqlValue;
use tokio_postgres::Row;

/// Rows of one table in source iteration order. Held only for the
/// duration of that table's copy.
#[derive(Debug, Default)]
pub struct RecordSet {
    /// Column names shared by every row.
    pub columns: Vec<String>,

    /// Row values, one Vec per row, index-aligned with `columns`.
    pub rows: Vec<Vec<SqlValue>>,
}

impl RecordSet {
    /// Convert raw rows. An empty scan yields an empty set with no
    /// column metadata, which is fine: nothing will be written.
    pub fn from_pg_rows(rows: &[Row]) -> Self {
        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| {
                (0..row.columns().len())
                    .map(|idx| SqlValue::from_pg_row(row, idx))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
