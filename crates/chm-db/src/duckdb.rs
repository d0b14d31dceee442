//! DuckDB database backend implementation
//!
//! The embedded store has no server-level databases, so the target database
//! maps to a schema inside the DuckDB file. Settings are applied with `SET`
//! around each statement and reset afterwards.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use chm_core::{Row, LEDGER_TABLE};
use chm_sql::{DuckDbDialect, Settings, SqlDialect};
use duckdb::types::Value;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    dialect: DuckDbDialect,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            dialect: DuckDbDialect::new(),
        }
    }

    /// Make `schema` the default for unqualified names in this session
    pub fn use_schema(&self, schema: &str) -> DbResult<()> {
        self.execute_batch_sync(&format!(
            "SET schema = {}",
            self.dialect.quote_literal(schema)
        ))
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Execute one statement with settings applied, then reset them
    fn execute_with_settings_sync(&self, sql: &str, settings: &Settings) -> DbResult<()> {
        for (name, value) in settings {
            self.execute_batch_sync(&format!(
                "SET {} = {}",
                name,
                self.dialect.quote_literal(value)
            ))?;
        }

        let result = self.execute_batch_sync(sql);

        for name in settings.keys() {
            if let Err(e) = self.execute_batch_sync(&format!("RESET {}", name)) {
                log::warn!("Failed to reset setting {}: {}", name, e);
            }
        }
        result
    }

    /// Query rows synchronously
    fn query_rows_sync(&self, sql: &str) -> DbResult<Vec<Row>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))?;
        let mut rows = stmt.query([])?;

        let columns: Vec<String> = rows
            .as_ref()
            .map(|s| {
                s.column_names()
                    .into_iter()
                    .map(|name| name.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                let value: Value = row.get(idx)?;
                record.insert(name.clone(), value_to_json(value));
            }
            result.push(record);
        }
        Ok(result)
    }

    /// Insert rows synchronously, one parameterized INSERT per row
    fn insert_rows_sync(&self, table: &str, rows: &[Row]) -> DbResult<()> {
        let conn = self.lock()?;
        for row in rows {
            let columns: Vec<String> = row
                .keys()
                .map(|c| self.dialect.quote_ident(c))
                .collect();
            let placeholders = vec!["?"; columns.len()].join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.dialect.quote_ident(table),
                columns.join(", "),
                placeholders
            );
            let params: Vec<Value> = row.values().map(json_to_value).collect();
            conn.execute(&sql, duckdb::params_from_iter(params))
                .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))?;
        }
        Ok(())
    }
}

fn value_to_json(value: Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => b.into(),
        Value::TinyInt(n) => n.into(),
        Value::SmallInt(n) => n.into(),
        Value::Int(n) => n.into(),
        Value::BigInt(n) => n.into(),
        Value::UTinyInt(n) => n.into(),
        Value::USmallInt(n) => n.into(),
        Value::UInt(n) => n.into(),
        Value::UBigInt(n) => n.into(),
        Value::Float(f) => serde_json::Number::from_f64(f64::from(f))
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Double(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Text(s) => s.into(),
        other => Json::String(format!("{:?}", other)),
    }
}

fn json_to_value(value: &serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::BigInt(i)
            } else if let Some(u) = n.as_u64() {
                Value::UBigInt(u)
            } else {
                Value::Double(n.as_f64().unwrap_or_default())
            }
        }
        Json::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str, settings: &Settings) -> DbResult<()> {
        self.execute_with_settings_sync(sql, settings)
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        self.query_rows_sync(sql)
    }

    async fn insert_rows(&self, table: &str, rows: &[Row]) -> DbResult<()> {
        self.insert_rows_sync(table, rows)
    }

    async fn create_database(&self, name: &str, engine: Option<&str>) -> DbResult<()> {
        if let Some(engine) = engine {
            log::warn!("DuckDB has no database engines; ignoring engine '{}'", engine);
        }
        let sql = format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            self.dialect.quote_ident(name)
        );
        self.execute_batch_sync(&sql)
    }

    async fn create_ledger_table(&self) -> DbResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                uid            UUID DEFAULT gen_random_uuid(),
                version        UINTEGER,
                checksum       VARCHAR,
                migration_name VARCHAR,
                applied_at     TIMESTAMP DEFAULT now()
            )",
            LEDGER_TABLE
        );
        self.execute_batch_sync(&sql)
    }

    fn dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn close(self: Box<Self>) -> DbResult<()> {
        let this = *self;
        let conn = this
            .conn
            .into_inner()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        conn.close().map_err(|(_, e)| DbError::from(e))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
