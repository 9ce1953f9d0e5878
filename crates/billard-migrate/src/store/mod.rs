//! PostgreSQL store access for both ends of the migration.
//!
//! One `PgStore` wraps a deadpool connection pool for a single endpoint.
//! The same type serves as source (reads) and target (writes); the
//! orchestrator owns one of each. Every call is bounded by the configured
//! per-statement deadline.

mod tls;
mod value;

pub use value::{SqlNullType, SqlValue};

use crate::config::{MigrationConfig, StoreConfig};
use crate::error::{MigrateError, Result};
use crate::record::RecordSet;
use deadpool_postgres::{Client, Manager, ManagerConfig, Pool, RecyclingMethod};
use std::future::Future;
use std::time::Duration;
use tokio_postgres::Config as PgConfig;
use tracing::{debug, info};

/// Connection pool for one PostgreSQL endpoint.
pub struct PgStore {
    pool: Pool,
    role: &'static str,
    deadline: Duration,
}

impl PgStore {
    /// Build the pool for an endpoint. No connection is attempted here;
    /// `ping` performs the first round trip.
    pub fn connect(
        config: &StoreConfig,
        migration: &MigrationConfig,
        role: &'static str,
    ) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = match tls::build_tls(config)? {
            Some(connector) => Manager::from_config(pg_config, connector, mgr_config),
            None => Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config),
        };

        let pool = Pool::builder(mgr)
            .max_size(migration.max_connections)
            .build()
            .map_err(|e| MigrateError::pool(e, format!("creating {} pool", role)))?;

        info!(
            "Configured {} store: {}:{}/{}",
            role, config.host, config.port, config.database
        );

        Ok(Self {
            pool,
            role,
            deadline: Duration::from_secs(migration.statement_timeout_secs),
        })
    }

    /// Trivial round-trip query to verify the endpoint is reachable.
    pub async fn ping(&self) -> Result<()> {
        let context = format!("pinging {}", self.role);
        self.with_deadline(&context, async {
            let client = self.client(&context).await?;
            client.simple_query("SELECT 1").await?;
            Ok(())
        })
        .await
    }

    /// Full unordered scan of a table.
    pub async fn read_table(&self, table: &str) -> Result<RecordSet> {
        let context = format!("reading table {}", table);
        self.with_deadline(&context, async {
            let client = self.client(&context).await?;
            let sql = format!("SELECT * FROM {}", quote_ident(table));
            let rows = client.query(&sql, &[]).await?;
            debug!("{}: read {} rows from {}", self.role, rows.len(), table);
            Ok(RecordSet::from_pg_rows(&rows))
        })
        .await
    }

    /// Delete every row of a table. Returns the number of rows removed.
    pub async fn delete_all(&self, table: &str) -> Result<u64> {
        let context = format!("clearing table {}", table);
        self.with_deadline(&context, async {
            let client = self.client(&context).await?;
            let sql = format!("DELETE FROM {}", quote_ident(table));
            let deleted = client.execute(&sql, &[]).await?;
            debug!("{}: deleted {} rows from {}", self.role, deleted, table);
            Ok(deleted)
        })
        .await
    }

    /// Execute a single prepared-free statement, returning affected rows.
    pub async fn execute(&self, sql: &str, context: &str) -> Result<u64> {
        self.with_deadline(context, async {
            let client = self.client(context).await?;
            Ok(client.execute(sql, &[]).await?)
        })
        .await
    }

    /// Advance a table's serial `id` sequence past the current maximum,
    /// with a floor of 1 for empty tables.
    pub async fn reset_sequence(&self, table: &str, pk_col: &str) -> Result<()> {
        let context = format!("resyncing sequence for {}", table);
        self.with_deadline(&context, async {
            let client = self.client(&context).await?;
            let sql = format!(
                "SELECT setval(pg_get_serial_sequence('{}', '{}'), \
                 COALESCE((SELECT MAX({}) FROM {}), 1))",
                quote_ident(table),
                pk_col,
                quote_ident(pk_col),
                quote_ident(table)
            );
            client.query_one(&sql, &[]).await?;
            debug!("{}: sequence reset for {}.{}", self.role, table, pk_col);
            Ok(())
        })
        .await
    }

    /// Close the pool. Idempotent; waiting callers get an error.
    pub fn close(&self) {
        self.pool.close();
        debug!("{} pool closed", self.role);
    }

    async fn client(&self, context: &str) -> Result<Client> {
        self.pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, format!("{} ({})", context, self.role)))
    }

    async fn with_deadline<T, F>(&self, context: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(MigrateError::timeout(context, self.deadline.as_secs())),
        }
    }
}

/// Quote a PostgreSQL identifier.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("Weird\"Name"), "\"Weird\"\"Name\"");
    }

    #[test]
    fn test_connect_builds_pool_without_io() {
        let store_config = StoreConfig {
            host: "unreachable.invalid".to_string(),
            port: 5432,
            database: "billard".to_string(),
            user: "postgres".to_string(),
            password: "pw".to_string(),
            ssl_mode: "disable".to_string(),
        };
        // Pool construction is lazy; the bogus host only fails at ping time.
        let store = PgStore::connect(&store_config, &MigrationConfig::default(), "source");
        assert!(store.is_ok());
    }
}
