//! Migration orchestrator - main workflow coordinator.
//!
//! Verifies connectivity to both stores, drives the per-table copy in
//! plan order, resynchronizes sequences, and always releases both pools
//! before returning the aggregated report.

use crate::config::Config;
use crate::error::Result;
use crate::plan::MigrationPlan;
use crate::report::MigrationReport;
use crate::sequence::SequenceResync;
use crate::store::PgStore;
use crate::transfer::TableMigrator;
use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Migration orchestrator.
pub struct Orchestrator {
    plan: MigrationPlan,
    source: PgStore,
    target: PgStore,
}

/// Result of probing both endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    pub target_connected: bool,
    pub target_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_error: Option<String>,
    pub healthy: bool,
}

impl Orchestrator {
    /// Create an orchestrator with the standard table plan.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_plan(config, MigrationPlan::standard())
    }

    /// Create an orchestrator with an explicit plan.
    pub fn with_plan(config: Config, plan: MigrationPlan) -> Result<Self> {
        let source = PgStore::connect(&config.source, &config.migration, "source")?;
        let target = PgStore::connect(&config.target, &config.migration, "target")?;
        Ok(Self {
            plan,
            source,
            target,
        })
    }

    /// Run the migration. Always returns a report; a connectivity failure
    /// or cancellation is reported as `success: false`.
    pub async fn run(self, cancel: CancellationToken) -> MigrationReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = MigrationReport::new(run_id.clone(), Utc::now());

        info!("Starting migration run: {}", run_id);

        // Connectivity gate: the single fatal-abort case. Nothing has
        // been copied yet, so the report carries no outcomes.
        if let Err(e) = self.source.ping().await {
            error!("source connectivity check failed: {}", e);
            report.fatal_error = Some(format!("source connection failed: {}", e));
            return self.finish(report);
        }
        report.source_ok = true;
        info!("Source connection: OK");

        if let Err(e) = self.target.ping().await {
            error!("target connectivity check failed: {}", e);
            report.fatal_error = Some(format!("target connection failed: {}", e));
            return self.finish(report);
        }
        report.target_ok = true;
        info!("Target connection: OK");

        let migrator = TableMigrator::new(&self.source, &self.target, cancel.clone());

        for spec in self.plan.tables() {
            if cancel.is_cancelled() {
                info!("cancellation requested, stopping before {}", spec.name);
                report.fatal_error = Some("migration cancelled".to_string());
                return self.finish(report);
            }

            let outcome = migrator.migrate(&spec.name).await;
            let interrupted = outcome.error.is_some() && cancel.is_cancelled();
            report.outcomes.push(outcome);

            if interrupted {
                report.fatal_error = Some("migration cancelled".to_string());
                return self.finish(report);
            }
        }

        // Sequence resync is best effort; individual failures are already
        // swallowed below the orchestrator.
        let resync = SequenceResync::new(&self.target);
        let sequence_tables = self.plan.sequence_tables();
        let succeeded = resync.resync_all(&sequence_tables).await;
        info!(
            "Sequences reset ({}/{} tables)",
            succeeded,
            sequence_tables.len()
        );
        report.sequences_reset = true;

        self.finish(report)
    }

    /// Probe both endpoints without touching any data.
    pub async fn health_check(&self) -> HealthReport {
        let start = std::time::Instant::now();
        let source_result = self.source.ping().await;
        let source_latency_ms = start.elapsed().as_millis() as u64;

        let start = std::time::Instant::now();
        let target_result = self.target.ping().await;
        let target_latency_ms = start.elapsed().as_millis() as u64;

        let report = HealthReport {
            source_connected: source_result.is_ok(),
            source_latency_ms,
            source_error: source_result.err().map(|e| e.to_string()),
            target_connected: target_result.is_ok(),
            target_latency_ms,
            target_error: target_result.err().map(|e| e.to_string()),
            healthy: false,
        };
        HealthReport {
            healthy: report.source_connected && report.target_connected,
            ..report
        }
    }

    /// Release both pools. Safe on every exit path.
    pub fn close(&self) {
        self.source.close();
        self.target.close();
    }

    fn finish(&self, mut report: MigrationReport) -> MigrationReport {
        self.close();
        report.success = report.fatal_error.is_none();
        report.completed_at = Utc::now();
        info!(
            "Migration {}: {} tables, {:.1}s",
            if report.success { "completed" } else { "failed" },
            report.outcomes.len(),
            report.duration_seconds()
        );
        report
    }
}
