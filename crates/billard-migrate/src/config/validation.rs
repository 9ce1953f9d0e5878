//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

const SSL_MODES: &[&str] = &["disable", "require", "verify-ca", "verify-full"];

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    for (side, store) in [("source", &config.source), ("target", &config.target)] {
        if store.host.is_empty() {
            return Err(MigrateError::Config(format!("{}.host is required", side)));
        }
        if store.database.is_empty() {
            return Err(MigrateError::Config(format!(
                "{}.database is required",
                side
            )));
        }
        if store.user.is_empty() {
            return Err(MigrateError::Config(format!("{}.user is required", side)));
        }
        if !SSL_MODES.contains(&store.ssl_mode.as_str()) {
            return Err(MigrateError::Config(format!(
                "{}.ssl_mode must be one of {:?}, got '{}'",
                side, SSL_MODES, store.ssl_mode
            )));
        }
    }

    // Cannot migrate a database onto itself
    if config.source.host == config.target.host
        && config.source.port == config.target.port
        && config.source.database == config.target.database
    {
        return Err(MigrateError::Config(
            "source and target cannot be the same database".into(),
        ));
    }

    if config.migration.statement_timeout_secs == 0 {
        return Err(MigrateError::Config(
            "migration.statement_timeout_secs must be at least 1".into(),
        ));
    }
    if config.migration.max_connections == 0 {
        return Err(MigrateError::Config(
            "migration.max_connections must be at least 1".into(),
        ));
    }

    Ok(())
}
