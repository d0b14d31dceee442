//! chm-sql - SQL layer for clickhouse-migrations
//!
//! This crate wraps sqlparser-rs dialects and turns the raw text of a
//! migration file into the ordered statements and session settings the
//! apply loop executes.

pub mod dialect;
pub mod error;
pub mod extractor;

pub use dialect::{ClickHouseDialect, DuckDbDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use extractor::{extract, ExtractedMigration, Settings};
