//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use chm_core::Row;
use chm_sql::{Settings, SqlDialect};

/// A live session against the target database.
///
/// Implementations must be Send + Sync for async operation. Every call is
/// awaited to completion before the next one starts.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement with session `settings` applied to it
    async fn execute(&self, sql: &str, settings: &Settings) -> DbResult<()>;

    /// Run a query and return every row as a column-name keyed object
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>>;

    /// Insert rows into `table`; each row maps column names to values
    async fn insert_rows(&self, table: &str, rows: &[Row]) -> DbResult<()>;

    /// Create a database if it does not exist
    async fn create_database(&self, name: &str, engine: Option<&str>) -> DbResult<()>;

    /// Create the `_migrations` ledger table if it does not exist
    async fn create_ledger_table(&self) -> DbResult<()>;

    /// SQL dialect used to tokenize migrations for this backend
    fn dialect(&self) -> &dyn SqlDialect;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Release the session
    fn close(self: Box<Self>) -> DbResult<()>;
}
