//! Per-table copy: full read from the source, destructive replace on the
//! target, row-at-a-time conflict-skipping inserts.

use crate::error::MigrateError;
use crate::report::TableOutcome;
use crate::store::{quote_ident, PgStore, SqlValue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Copies one table from source to target and reports the outcome.
///
/// Failure isolation: a table-scoped error (read or delete) is captured
/// in the outcome and never propagated; a row-scoped error is classified,
/// counted, and the loop continues with the next row.
pub struct TableMigrator<'a> {
    source: &'a PgStore,
    target: &'a PgStore,
    cancel: CancellationToken,
}

impl<'a> TableMigrator<'a> {
    pub fn new(source: &'a PgStore, target: &'a PgStore, cancel: CancellationToken) -> Self {
        Self {
            source,
            target,
            cancel,
        }
    }

    /// Copy one table. Never returns an error; the outcome carries any
    /// failure.
    pub async fn migrate(&self, table: &str) -> TableOutcome {
        let mut outcome = TableOutcome::new(table);

        let records = match self.source.read_table(table).await {
            Ok(records) => records,
            Err(e) => {
                warn!("{}: read failed - {}", table, e);
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };
        outcome.rows_found = records.len() as i64;

        // An empty source is a no-op: never clear a target table for
        // nothing.
        if records.is_empty() {
            return outcome;
        }

        if let Err(e) = self.target.delete_all(table).await {
            warn!("{}: clearing target failed - {}", table, e);
            outcome.error = Some(e.to_string());
            return outcome;
        }

        let context = format!("inserting into {}", table);
        for row in &records.rows {
            if self.cancel.is_cancelled() {
                outcome.error = Some(format!(
                    "cancelled after {} of {} rows",
                    outcome.rows_migrated, outcome.rows_found
                ));
                return outcome;
            }

            let Some(sql) = build_row_insert(table, &records.columns, row) else {
                // Every column was null; there is nothing to write.
                outcome.record_row_error("empty_row");
                continue;
            };

            match self.target.execute(&sql, &context).await {
                Ok(_) => outcome.rows_migrated += 1,
                Err(e) => {
                    let class = error_class(&e);
                    debug!("{}: row skipped ({}) - {}", table, class, e);
                    outcome.record_row_error(&class);
                }
            }
        }

        info!(
            "{}: found {} rows, migrated {}",
            table, outcome.rows_found, outcome.rows_migrated
        );
        outcome
    }
}

/// Build a conflict-skipping INSERT for one row, using only its non-null
/// columns so column defaults still apply on the target. Returns None
/// when every column is null.
pub(crate) fn build_row_insert(
    table: &str,
    columns: &[String],
    row: &[SqlValue],
) -> Option<String> {
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for (col, value) in columns.iter().zip(row) {
        if value.is_null() {
            continue;
        }
        cols.push(quote_ident(col));
        values.push(value.to_literal());
    }

    if cols.is_empty() {
        return None;
    }

    Some(format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
        quote_ident(table),
        cols.join(", "),
        values.join(", ")
    ))
}

/// Bucket a row-level write error for the outcome's skip counts.
fn error_class(err: &MigrateError) -> String {
    match err {
        MigrateError::Timeout { .. } => "timeout".to_string(),
        MigrateError::Pool { .. } => "connection".to_string(),
        _ => error_class_from_code(err.sql_state()),
    }
}

/// Map a SQLSTATE to a readable class name; unknown codes pass through.
fn error_class_from_code(code: Option<&str>) -> String {
    match code {
        Some("23502") => "not_null_violation".to_string(),
        Some("23503") => "foreign_key_violation".to_string(),
        Some("23505") => "unique_violation".to_string(),
        Some("23514") => "check_violation".to_string(),
        Some("22001") => "string_data_too_long".to_string(),
        Some("22P02") => "invalid_text_representation".to_string(),
        Some("42703") => "undefined_column".to_string(),
        Some(other) => other.to_string(),
        None => "connection".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqlNullType;

    #[test]
    fn test_build_row_insert_basic() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let row = vec![SqlValue::I32(1), SqlValue::String("Carambole".to_string())];
        assert_eq!(
            build_row_insert("clubs", &columns, &row).unwrap(),
            "INSERT INTO \"clubs\" (\"id\", \"name\") VALUES (1, 'Carambole') \
             ON CONFLICT DO NOTHING"
        );
    }

    #[test]
    fn test_build_row_insert_excludes_null_columns() {
        let columns = vec![
            "id".to_string(),
            "name".to_string(),
            "phone".to_string(),
        ];
        let row = vec![
            SqlValue::I32(2),
            SqlValue::String("Breux".to_string()),
            SqlValue::Null(SqlNullType::String),
        ];
        let sql = build_row_insert("players", &columns, &row).unwrap();
        assert!(!sql.contains("phone"));
        assert!(!sql.contains("NULL"));
        assert!(sql.contains("\"id\", \"name\""));
    }

    #[test]
    fn test_build_row_insert_all_null_returns_none() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let row = vec![
            SqlValue::Null(SqlNullType::I32),
            SqlValue::Null(SqlNullType::String),
        ];
        assert!(build_row_insert("t", &columns, &row).is_none());
    }

    #[test]
    fn test_build_row_insert_escapes_values() {
        let columns = vec!["name".to_string()];
        let row = vec![SqlValue::String("l'Académie".to_string())];
        let sql = build_row_insert("clubs", &columns, &row).unwrap();
        assert!(sql.contains("'l''Académie'"));
    }

    #[test]
    fn test_error_class_from_code() {
        assert_eq!(error_class_from_code(Some("23505")), "unique_violation");
        assert_eq!(
            error_class_from_code(Some("23503")),
            "foreign_key_violation"
        );
        assert_eq!(error_class_from_code(Some("58030")), "58030");
        assert_eq!(error_class_from_code(None), "connection");
    }

    #[test]
    fn test_error_class_timeout() {
        let err = MigrateError::timeout("inserting into users", 30);
        assert_eq!(error_class(&err), "timeout");
    }
}
