//! Migration report: per-table outcomes and the aggregate result the
//! trigger returns to its caller.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one table's copy. Created per table, appended to the
/// report, never mutated after the table completes.
#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    /// Table name.
    pub table: String,

    /// Rows read from the source.
    pub rows_found: i64,

    /// Rows successfully written to the target (conflict-skips included).
    pub rows_migrated: i64,

    /// Table-scoped failure (read or delete error, or cancellation).
    /// When set with `rows_found == 0`, the initial read itself failed.
    pub error: Option<String>,

    /// Per-row write failures, counted by error class. The difference
    /// between `rows_found` and `rows_migrated` is itemized here.
    pub row_errors: BTreeMap<String, u64>,
}

impl TableOutcome {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            rows_found: 0,
            rows_migrated: 0,
            error: None,
            row_errors: BTreeMap::new(),
        }
    }

    /// Count one skipped row under its error class.
    pub fn record_row_error(&mut self, class: &str) {
        *self.row_errors.entry(class.to_string()).or_insert(0) += 1;
    }

    /// Total rows skipped by per-row errors.
    pub fn rows_skipped(&self) -> u64 {
        self.row_errors.values().sum()
    }

    /// Operator-facing result lines for this table.
    pub fn lines(&self) -> Vec<String> {
        // A set error with zero rows found means the read never produced
        // data; anything later (delete failure, cancellation) only happens
        // on a non-empty read.
        if self.error.is_some() && self.rows_found == 0 {
            return vec![format!(
                "{}: ERROR - {}",
                self.table,
                self.error.as_deref().unwrap_or("unknown")
            )];
        }

        let mut lines = vec![format!("{}: found {} rows", self.table, self.rows_found)];

        if let Some(err) = &self.error {
            lines.push(format!("{}: ERROR - {}", self.table, err));
            return lines;
        }

        if self.rows_found > 0 {
            lines.push(format!(
                "{}: migrated {} rows",
                self.table, self.rows_migrated
            ));
        }

        if !self.row_errors.is_empty() {
            let detail: Vec<String> = self
                .row_errors
                .iter()
                .map(|(class, count)| format!("{}={}", class, count))
                .collect();
            lines.push(format!(
                "{}: skipped {} rows ({})",
                self.table,
                self.rows_skipped(),
                detail.join(", ")
            ));
        }

        lines
    }
}

/// Aggregate result of one migration run. Immutable after return.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Unique run identifier.
    pub run_id: String,

    /// False only on fatal abort (connectivity failure or cancellation).
    pub success: bool,

    /// The fatal error, when `success` is false.
    pub fatal_error: Option<String>,

    /// Source endpoint answered the connectivity check.
    pub source_ok: bool,

    /// Target endpoint answered the connectivity check.
    pub target_ok: bool,

    /// Per-table outcomes in plan order.
    pub outcomes: Vec<TableOutcome>,

    /// Whether the sequence resync phase ran.
    pub sequences_reset: bool,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,
}

/// Wire form returned by the migration trigger.
#[derive(Serialize)]
struct WireReport<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    results: Vec<String>,
}

impl MigrationReport {
    pub fn new(run_id: String, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            success: false,
            fatal_error: None,
            source_ok: false,
            target_ok: false,
            outcomes: Vec::new(),
            sequences_reset: false,
            started_at,
            completed_at: started_at,
        }
    }

    /// Run duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Ordered, human-readable result lines.
    pub fn result_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.source_ok {
            lines.push("Source connection: OK".to_string());
        }
        if self.target_ok {
            lines.push("Target connection: OK".to_string());
        }
        for outcome in &self.outcomes {
            lines.extend(outcome.lines());
        }
        if self.sequences_reset {
            lines.push("Sequences reset".to_string());
        }
        lines
    }

    /// Serialize to the wire JSON the trigger returns:
    /// `{"success": bool, "results": [...]}` with an `"error"` field on
    /// fatal abort.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.wire())?)
    }

    /// Wire form as a JSON value (for HTTP responses).
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.wire())?)
    }

    fn wire(&self) -> WireReport<'_> {
        WireReport {
            success: self.success,
            error: self.fatal_error.as_deref(),
            results: self.result_lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> MigrationReport {
        MigrationReport::new("run-1".to_string(), Utc::now())
    }

    #[test]
    fn test_outcome_lines_success() {
        let mut outcome = TableOutcome::new("users");
        outcome.rows_found = 3;
        outcome.rows_migrated = 3;
        assert_eq!(
            outcome.lines(),
            vec!["users: found 3 rows", "users: migrated 3 rows"]
        );
    }

    #[test]
    fn test_outcome_lines_empty_table() {
        let mut outcome = TableOutcome::new("calendar");
        outcome.rows_found = 0;
        assert_eq!(outcome.lines(), vec!["calendar: found 0 rows"]);
    }

    #[test]
    fn test_outcome_lines_read_error() {
        let mut outcome = TableOutcome::new("players");
        outcome.error = Some("relation \"players\" does not exist".to_string());
        let lines = outcome.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("players: ERROR - "));
    }

    #[test]
    fn test_outcome_lines_delete_error_keeps_found_line() {
        let mut outcome = TableOutcome::new("clubs");
        outcome.rows_found = 7;
        outcome.error = Some("permission denied".to_string());
        assert_eq!(
            outcome.lines(),
            vec!["clubs: found 7 rows", "clubs: ERROR - permission denied"]
        );
    }

    #[test]
    fn test_outcome_lines_row_errors() {
        let mut outcome = TableOutcome::new("rankings");
        outcome.rows_found = 5;
        outcome.rows_migrated = 3;
        outcome.record_row_error("foreign_key_violation");
        outcome.record_row_error("foreign_key_violation");
        let lines = outcome.lines();
        assert_eq!(lines[0], "rankings: found 5 rows");
        assert_eq!(lines[1], "rankings: migrated 3 rows");
        assert_eq!(
            lines[2],
            "rankings: skipped 2 rows (foreign_key_violation=2)"
        );
    }

    #[test]
    fn test_wire_json_success_shape() {
        let mut r = report();
        r.success = true;
        r.source_ok = true;
        r.target_ok = true;
        let mut outcome = TableOutcome::new("users");
        outcome.rows_found = 3;
        outcome.rows_migrated = 3;
        r.outcomes.push(outcome);
        r.sequences_reset = true;

        let value: serde_json::Value = serde_json::from_str(&r.to_json().unwrap()).unwrap();
        assert_eq!(value["success"], serde_json::json!(true));
        assert!(value.get("error").is_none());
        let results = value["results"].as_array().unwrap();
        assert_eq!(results[0], "Source connection: OK");
        assert_eq!(results[1], "Target connection: OK");
        assert_eq!(results[2], "users: found 3 rows");
        assert_eq!(results[3], "users: migrated 3 rows");
        assert_eq!(results[4], "Sequences reset");
    }

    #[test]
    fn test_wire_json_fatal_shape() {
        let mut r = report();
        r.success = false;
        r.fatal_error = Some("source connection failed: timeout".to_string());

        let value: serde_json::Value = serde_json::from_str(&r.to_json().unwrap()).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(
            value["error"],
            serde_json::json!("source connection failed: timeout")
        );
        assert!(value["results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_duration_non_negative() {
        let mut r = report();
        r.completed_at = r.started_at + chrono::Duration::milliseconds(1500);
        assert!((r.duration_seconds() - 1.5).abs() < f64::EPSILON);
    }
}
