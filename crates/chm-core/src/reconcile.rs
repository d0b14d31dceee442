//! Reconciliation of discovered migrations against the ledger
//!
//! Two directions are checked. Every ledger version must still exist on
//! disk, and every discovered migration that the ledger knows about must
//! still hash to the recorded checksum. Everything else is pending.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::ledger::Ledger;
use crate::migration::MigrationFile;
use std::collections::HashSet;

/// Classification of a discovered migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    /// Recorded in the ledger with an unchanged checksum
    Applied,
    /// Not yet recorded in the ledger
    Pending,
}

/// A discovered migration with its classification
#[derive(Debug, Clone)]
pub struct ReconciledMigration {
    pub migration: MigrationFile,
    pub status: MigrationStatus,
}

/// Result of reconciling disk state with the ledger
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    migrations: Vec<ReconciledMigration>,
}

impl Reconciliation {
    /// All migrations in ascending version order
    pub fn migrations(&self) -> &[ReconciledMigration] {
        &self.migrations
    }

    /// Pending migrations in ascending version order
    pub fn pending(&self) -> impl Iterator<Item = &MigrationFile> {
        self.migrations
            .iter()
            .filter(|m| m.status == MigrationStatus::Pending)
            .map(|m| &m.migration)
    }

    /// Number of migrations already applied
    pub fn applied_count(&self) -> usize {
        self.migrations
            .iter()
            .filter(|m| m.status == MigrationStatus::Applied)
            .count()
    }

    /// Whether anything needs to be applied
    pub fn has_pending(&self) -> bool {
        self.pending().next().is_some()
    }
}

/// Classify `migrations` (ascending) against `ledger`.
///
/// Stops at the first drift: a ledger entry without a file, or an applied
/// file whose content changed.
pub fn reconcile(migrations: &[MigrationFile], ledger: &Ledger) -> CoreResult<Reconciliation> {
    let discovered: HashSet<u32> = migrations.iter().map(|m| m.version).collect();
    if let Some(removed) = ledger.iter().find(|e| !discovered.contains(&e.version)) {
        return Err(CoreError::MigrationRemoved {
            version: removed.version,
            name: removed.migration_name.clone(),
        });
    }

    let migrations = migrations
        .iter()
        .map(|migration| classify(migration, ledger))
        .collect::<CoreResult<Vec<_>>>()?;

    Ok(Reconciliation { migrations })
}

fn classify(migration: &MigrationFile, ledger: &Ledger) -> CoreResult<ReconciledMigration> {
    let status = match ledger.get(migration.version) {
        None => MigrationStatus::Pending,
        Some(entry) => {
            let checksum = compute_checksum(&migration.read_content()?);
            if checksum != entry.checksum {
                return Err(CoreError::MigrationChanged {
                    version: migration.version,
                    name: entry.migration_name.clone(),
                });
            }
            if entry.migration_name != migration.name {
                log::warn!(
                    "Migration version {} was applied as {} and is now named {}",
                    migration.version,
                    entry.migration_name,
                    migration.name
                );
            }
            MigrationStatus::Applied
        }
    };

    Ok(ReconciledMigration {
        migration: migration.clone(),
        status,
    })
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
