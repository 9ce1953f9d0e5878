//! # billard-migrate
//!
//! Cross-database data migration engine for the billard ranking backend.
//!
//! Copies the full contents of a fixed set of interdependent tables from a
//! source PostgreSQL database to a target PostgreSQL database:
//!
//! - **Referential order** - tables are copied parents-first, following a
//!   declared dependency list that is validated at plan construction
//! - **Failure isolation** - a failed table never stops the run; a failed
//!   row never stops its table
//! - **Idempotent writes** - conflicting keys are skipped, so re-running a
//!   partial migration is safe
//! - **Sequence resync** - serial primary-key counters on the target are
//!   advanced past the migrated ids afterward
//!
//! The target tables are fully replaced: rows present only in the target
//! are purged before the copy. This is destructive, not a merge.
//!
//! ## Example
//!
//! ```rust,no_run
//! use billard_migrate::{Config, Orchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> billard_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let orchestrator = Orchestrator::new(config)?;
//!     let report = orchestrator.run(CancellationToken::new()).await;
//!     println!("{}", report.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod record;
pub mod report;
pub mod sequence;
pub mod store;
pub mod transfer;

// Re-exports for convenient access
pub use config::{Config, MigrationConfig, StoreConfig};
pub use error::{MigrateError, Result};
pub use orchestrator::{HealthReport, Orchestrator};
pub use plan::{MigrationPlan, TableSpec};
pub use record::RecordSet;
pub use report::{MigrationReport, TableOutcome};
pub use store::{PgStore, SqlValue};
pub use transfer::TableMigrator;
