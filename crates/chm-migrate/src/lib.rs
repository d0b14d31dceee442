//! chm-migrate - Migration engine for clickhouse-migrations
//!
//! This crate applies pending migrations statement by statement and
//! orchestrates a full run: discovery, database bootstrap, ledger read,
//! reconciliation and apply.

pub mod error;
pub mod pipeline;
pub mod runner;

pub use error::{MigrateError, MigrateResult};
pub use pipeline::{applied_message, migrate, MigrateOutcome};
pub use runner::{AppliedMigration, ApplyReport, MigrationRunner};
