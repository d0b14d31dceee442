//! chm-db - Database layer for clickhouse-migrations
//!
//! This crate provides the `Database` session trait, the ClickHouse HTTP
//! and DuckDB backends, URL-based backend selection, and ledger access.

pub mod clickhouse;
pub mod connect;
pub mod duckdb;
pub mod error;
pub mod ledger;
pub mod traits;

pub use clickhouse::ClickHouseBackend;
pub use connect::{connect, ConnectionConfig, DUCKDB_SCHEME};
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use ledger::{read_ledger, record_migration};
pub use traits::Database;
