//! Error types for chm-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Unreadable server response (D003)
    #[error("[D003] Unexpected database response: {0}")]
    InvalidResponse(String),

    /// Unsupported connection URL (D004)
    #[error("[D004] Unsupported database url '{0}': expected http://, https:// or duckdb:")]
    UnsupportedUrl(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Ledger rows could not be decoded (D006)
    #[error("[D006] {0}")]
    Ledger(#[from] chm_core::CoreError),

    /// DuckDB url without a database file (D007)
    #[error("[D007] DuckDB url '{0}' must name a database file: an in-memory database is lost between the sessions of a run")]
    DuckDbPathRequired(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
