//! Error types for chm-core

use thiserror::Error;

/// Core error type for clickhouse-migrations
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Migrations directory cannot be listed
    #[error("[C001] no migration directory {path}. Please create it. ({source})")]
    MigrationsDirNotFound {
        path: String,
        source: std::io::Error,
    },

    /// C002: Migration file name has no positive numeric prefix
    #[error("[C002] a migration name should start from number, example: 1_init.sql. Please check, if the migration {file} is named correctly")]
    InvalidMigrationName { file: String },

    /// C003: Two migration files share a version
    #[error("[C003] migrations {first} and {second} share version {version}. Each migration needs a unique version")]
    DuplicateVersion {
        version: u32,
        first: String,
        second: String,
    },

    /// C004: Ledger references a migration that is no longer on disk
    #[error("[C004] a migration file shouldn't be removed after apply. Please, restore the migration {name} (version {version})")]
    MigrationRemoved { version: u32, name: String },

    /// C005: Applied migration content no longer matches its recorded checksum
    #[error("[C005] a migration file shouldn't be changed after apply. Please, restore content of the {name} migration (version {version})")]
    MigrationChanged { version: u32, name: String },

    /// C006: Ledger row does not match the expected record shape
    #[error("[C006] unexpected row in the _migrations table {row}: {message}")]
    InvalidLedgerRow { row: String, message: String },

    /// C007: Ledger holds different checksums for the same version
    #[error("[C007] the _migrations table holds conflicting entries for version {version}: {first} and {second}")]
    ConflictingLedgerEntries {
        version: u32,
        first: String,
        second: String,
    },

    /// C008: Configuration file not found
    #[error("[C008] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C009: Invalid or missing configuration value
    #[error("[C009] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C010: IO error with file path context
    #[error("[C010] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C011: Config YAML parse error
    #[error("[C011] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
