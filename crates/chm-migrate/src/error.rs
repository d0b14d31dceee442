//! Error types for chm-migrate

use chm_core::CoreError;
use chm_db::DbError;
use chm_sql::SqlError;
use thiserror::Error;

/// Fatal outcomes of a migration run
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Discovery, configuration or drift failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// M001: A session could not be opened
    #[error("[M001] can't connect to the database: {0}")]
    Connect(#[source] DbError),

    /// M002: Target database could not be created
    #[error("[M002] can't create the database {database}. {source}")]
    CreateDatabase { database: String, source: DbError },

    /// M003: Ledger table could not be created
    #[error("[M003] can't create the _migrations table. {0}")]
    CreateLedgerTable(#[source] DbError),

    /// M004: Ledger could not be read or decoded
    #[error("[M004] can't select data from the _migrations table. {0}")]
    ReadLedger(#[source] DbError),

    /// M005: Migration file could not be split into statements
    #[error("[M005] can't parse the migration {migration}. {source}")]
    Extract {
        migration: String,
        source: SqlError,
    },

    /// M006: A statement of a pending migration failed
    #[error("[M006] the migrations {migration} has an error. Please, fix it (be sure that already executed parts of the migration would not be run second time) and re-run migration script. {source}")]
    StatementFailed {
        /// Migrations fully applied earlier in this run
        applied: Vec<String>,
        migration: String,
        source: DbError,
    },

    /// M007: Migration ran but its ledger row could not be written
    #[error("[M007] can't insert a data into the table _migrations for {migration}. {source}")]
    RecordFailed { migration: String, source: DbError },
}

impl MigrateError {
    /// Migrations that completed before the run failed
    pub fn applied(&self) -> &[String] {
        match self {
            MigrateError::StatementFailed { applied, .. } => applied,
            _ => &[],
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
