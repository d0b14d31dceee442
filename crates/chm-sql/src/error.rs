//! Error types for chm-sql

use thiserror::Error;

/// Statement extraction errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL tokenizer error (S001)
    #[error("[S001] SQL tokenize error: {0}")]
    Tokenize(String),

    /// Malformed SET statement (S002)
    #[error("[S002] Invalid SET statement '{statement}': expected SET name = value[, name = value]")]
    InvalidSetting { statement: String },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
