//! chm-core - Core library for clickhouse-migrations
//!
//! This crate provides migration discovery, the ledger record model,
//! reconciliation of disk state against the ledger, checksums and run
//! configuration used across all clickhouse-migrations components.

pub mod checksum;
pub mod config;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod reconcile;

pub use checksum::compute_checksum;
pub use config::{Config, ResolvedConfig};
pub use error::{CoreError, CoreResult};
pub use ledger::{Ledger, LedgerEntry, Row, LEDGER_TABLE};
pub use migration::{discover_migrations, MigrationFile, MIGRATION_EXTENSION};
pub use reconcile::{reconcile, MigrationStatus, ReconciledMigration, Reconciliation};
