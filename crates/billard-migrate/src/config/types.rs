//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (read side).
    pub source: StoreConfig,

    /// Target database configuration (write side).
    pub target: StoreConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Connection descriptor for one PostgreSQL endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password. Prefer supplying this through the environment
    /// (`MIGRATE_SOURCE_PASSWORD` / `MIGRATE_TARGET_PASSWORD`).
    #[serde(default)]
    pub password: String,

    /// SSL mode: disable, require (encrypted, certificate not verified),
    /// or verify-full (default: "require").
    #[serde(default = "default_require")]
    pub ssl_mode: String,
}

// Manual Debug so connection details can be logged without leaking secrets.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Deadline applied to every individual database call, in seconds
    /// (default: 30).
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,

    /// Maximum pooled connections per endpoint (default: 4). The copy
    /// itself is strictly sequential; the pool only absorbs reconnects.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            statement_timeout_secs: default_statement_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_pg_port() -> u16 {
    5432
}

fn default_require() -> String {
    "require".to_string()
}

fn default_statement_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    4
}
