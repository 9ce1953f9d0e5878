//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Migration plan error (unknown or misordered dependency)
    #[error("Plan error: {0}")]
    Plan(String),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Database query or protocol error
    #[error("Database error: {0}")]
    Db(#[from] tokio_postgres::Error),

    /// A statement exceeded the configured deadline
    #[error("Timed out after {seconds}s: {context}")]
    Timeout { context: String, seconds: u64 },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Migration was cancelled (SIGINT, etc.)
    #[error("Migration cancelled")]
    Cancelled,
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Timeout error for a statement context
    pub fn timeout(context: impl Into<String>, seconds: u64) -> Self {
        MigrateError::Timeout {
            context: context.into(),
            seconds,
        }
    }

    /// SQLSTATE code of the underlying database error, if there is one.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            MigrateError::Db(e) => e.code().map(|c| c.code()),
            _ => None,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Plan(_) => 2,
            MigrateError::Pool { .. } | MigrateError::Db(_) => 3,
            MigrateError::Timeout { .. } => 4,
            MigrateError::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_carries_context() {
        let err = MigrateError::pool("connection refused", "pinging source");
        let text = err.to_string();
        assert!(text.contains("connection refused"));
        assert!(text.contains("pinging source"));
    }

    #[test]
    fn test_timeout_error_message() {
        let err = MigrateError::timeout("reading table users", 30);
        assert_eq!(err.to_string(), "Timed out after 30s: reading table users");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Config("bad".into()).exit_code(), 2);
        assert_eq!(MigrateError::pool("x", "y").exit_code(), 3);
        assert_eq!(MigrateError::timeout("z", 1).exit_code(), 4);
        assert_eq!(MigrateError::Cancelled.exit_code(), 130);
    }

    #[test]
    fn test_sql_state_absent_for_non_db_errors() {
        assert!(MigrateError::Config("bad".into()).sql_state().is_none());
        assert!(MigrateError::Cancelled.sql_state().is_none());
    }
}
