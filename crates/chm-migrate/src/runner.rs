//! Apply loop

use crate::error::{MigrateError, MigrateResult};
use chm_core::{compute_checksum, LedgerEntry, MigrationFile, Reconciliation};
use chm_db::{record_migration, Database};
use chm_sql::extract;
use std::time::{Duration, Instant};

/// A migration applied during this run
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    /// Migration version
    pub version: u32,

    /// Migration file name
    pub name: String,

    /// Number of statements executed
    pub statements: usize,

    /// Execution time
    pub duration: Duration,
}

/// Summary of an apply pass
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// Migrations applied, in order
    pub applied: Vec<AppliedMigration>,

    /// Migrations already recorded in the ledger
    pub skipped: usize,
}

impl ApplyReport {
    /// File names of the applied migrations
    pub fn applied_names(&self) -> Vec<String> {
        self.applied.iter().map(|m| m.name.clone()).collect()
    }
}

/// Runs pending migrations statement by statement against one session
pub struct MigrationRunner<'a> {
    db: &'a dyn Database,
}

impl<'a> MigrationRunner<'a> {
    /// Create a new runner
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Apply every pending migration of `reconciliation` in ascending order.
    ///
    /// Stops at the first failure. Migrations completed before it stay
    /// recorded in the ledger.
    pub async fn apply(&self, reconciliation: &Reconciliation) -> MigrateResult<ApplyReport> {
        let mut report = ApplyReport {
            applied: Vec::new(),
            skipped: reconciliation.applied_count(),
        };

        for migration in reconciliation.pending() {
            let applied = self.apply_one(migration, &report).await?;
            log::info!(
                "Applied {} ({} statement(s), {}ms)",
                applied.name,
                applied.statements,
                applied.duration.as_millis()
            );
            report.applied.push(applied);
        }

        Ok(report)
    }

    async fn apply_one(
        &self,
        migration: &MigrationFile,
        report: &ApplyReport,
    ) -> MigrateResult<AppliedMigration> {
        let start = Instant::now();
        let content = migration.read_content()?;
        let checksum = compute_checksum(&content);
        let extracted =
            extract(&content, self.db.dialect()).map_err(|e| MigrateError::Extract {
                migration: migration.name.clone(),
                source: e,
            })?;

        if !extracted.settings.is_empty() {
            log::debug!(
                "{}: applying settings {:?}",
                migration.name,
                extracted.settings
            );
        }

        for (index, statement) in extracted.statements.iter().enumerate() {
            log::debug!(
                "{} [{}/{}]: {}",
                migration.name,
                index + 1,
                extracted.statements.len(),
                statement
            );
            self.db
                .execute(statement, &extracted.settings)
                .await
                .map_err(|e| MigrateError::StatementFailed {
                    applied: report.applied_names(),
                    migration: migration.name.clone(),
                    source: e,
                })?;
        }

        let entry = LedgerEntry {
            version: migration.version,
            checksum,
            migration_name: migration.name.clone(),
        };
        record_migration(self.db, &entry)
            .await
            .map_err(|e| MigrateError::RecordFailed {
                migration: migration.name.clone(),
                source: e,
            })?;

        Ok(AppliedMigration {
            version: migration.version,
            name: migration.name.clone(),
            statements: extracted.statements.len(),
            duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
