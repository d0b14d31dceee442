//! One full migration run
//!
//! Discovery runs first so that a bad migrations directory is reported
//! before any connection is made. The target database is then created on a
//! server-level session, and everything else happens on a session bound to
//! it.

use crate::error::{MigrateError, MigrateResult};
use crate::runner::{ApplyReport, MigrationRunner};
use chm_core::{discover_migrations, reconcile, ResolvedConfig};
use chm_db::{connect, read_ledger, ConnectionConfig, Database};
use std::time::{Duration, Instant};

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct MigrateOutcome {
    /// Migrations applied by this run, in order
    pub applied: Vec<String>,

    /// Migrations that were already applied
    pub skipped: usize,

    /// Wall-clock time of the run
    pub duration: Duration,
}

impl MigrateOutcome {
    /// Line reported to the user once the run finishes
    pub fn summary(&self) -> String {
        if self.applied.is_empty() {
            "No migrations to apply.".to_string()
        } else {
            applied_message(&self.applied)
        }
    }
}

/// Message listing migrations that were applied
pub fn applied_message(applied: &[String]) -> String {
    format!(
        "The migration(s) {} was successfully applied!",
        applied.join(", ")
    )
}

/// Run every pending migration described by `config`
pub async fn migrate(config: &ResolvedConfig) -> MigrateResult<MigrateOutcome> {
    let start = Instant::now();

    let migrations = discover_migrations(&config.migrations_home)?;
    if migrations.is_empty() {
        log::warn!(
            "no migrations in the {} migrations directory",
            config.migrations_home.display()
        );
    }

    let connection = ConnectionConfig::from(config);
    ensure_database(&connection, &config.db, config.engine.as_deref()).await?;

    let db = connect(&connection, Some(&config.db)).map_err(MigrateError::Connect)?;
    log::debug!("Connected to {} database {}", db.db_type(), config.db);

    let result = apply_pending(db.as_ref(), &migrations).await;
    if let Err(e) = db.close() {
        log::warn!("Failed to close database session: {}", e);
    }
    let report = result?;

    Ok(MigrateOutcome {
        applied: report.applied_names(),
        skipped: report.skipped,
        duration: start.elapsed(),
    })
}

/// Create the target database on a server-level session
async fn ensure_database(
    connection: &ConnectionConfig,
    database: &str,
    engine: Option<&str>,
) -> MigrateResult<()> {
    let server = connect(connection, None).map_err(MigrateError::Connect)?;
    let created = server.create_database(database, engine).await;
    if let Err(e) = server.close() {
        log::warn!("Failed to close database session: {}", e);
    }
    created.map_err(|e| MigrateError::CreateDatabase {
        database: database.to_string(),
        source: e,
    })
}

async fn apply_pending(
    db: &dyn Database,
    migrations: &[chm_core::MigrationFile],
) -> MigrateResult<ApplyReport> {
    db.create_ledger_table()
        .await
        .map_err(MigrateError::CreateLedgerTable)?;

    let ledger = read_ledger(db).await.map_err(MigrateError::ReadLedger)?;
    let reconciliation = reconcile(migrations, &ledger)?;
    log::debug!(
        "{} migration(s) already applied, {} pending",
        reconciliation.applied_count(),
        reconciliation.pending().count()
    );

    MigrationRunner::new(db).apply(&reconciliation).await
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
