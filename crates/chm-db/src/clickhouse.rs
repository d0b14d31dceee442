//! ClickHouse backend over the HTTP interface
//!
//! Every call is one POST: the statement travels in the body, the target
//! database and per-statement settings as URL parameters, and credentials in
//! the `X-ClickHouse-User` / `X-ClickHouse-Key` headers.

use crate::connect::ConnectionConfig;
use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use chm_core::{Row, LEDGER_TABLE};
use chm_sql::{ClickHouseDialect, Settings, SqlDialect};
use reqwest::Client;

/// Reported to the server as the HTTP user agent
const APPLICATION: &str = concat!("clickhouse-migrations/", env!("CARGO_PKG_VERSION"));

/// ClickHouse HTTP backend
pub struct ClickHouseBackend {
    client: Client,
    url: String,
    user: String,
    password: Option<String>,
    database: Option<String>,
    dialect: ClickHouseDialect,
}

impl ClickHouseBackend {
    /// Create a client for `database` (or the server default when `None`).
    ///
    /// No request is made until the first statement runs.
    pub fn new(config: &ConnectionConfig, database: Option<&str>) -> DbResult<Self> {
        let mut builder = Client::builder().user_agent(APPLICATION);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            database: database.map(str::to_string),
            dialect: ClickHouseDialect::new(),
        })
    }

    /// Settings that make the server answer only after DDL completes
    fn ddl_settings() -> Settings {
        let mut settings = Settings::new();
        settings.insert("wait_end_of_query".to_string(), "1".to_string());
        settings
    }

    /// POST `body` with `params` and `settings` as URL parameters
    async fn post(
        &self,
        params: &[(&str, &str)],
        settings: &Settings,
        body: String,
    ) -> DbResult<String> {
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + settings.len() + 1);
        if let Some(database) = &self.database {
            query.push(("database", database.as_str()));
        }
        query.extend_from_slice(params);
        query.extend(settings.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let mut request = self
            .client
            .post(&self.url)
            .query(&query)
            .header("X-ClickHouse-User", &self.user)
            .body(body);
        if let Some(password) = &self.password {
            request = request.header("X-ClickHouse-Key", password);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        if !status.is_success() {
            return Err(DbError::ExecutionError(text.trim().to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl Database for ClickHouseBackend {
    async fn execute(&self, sql: &str, settings: &Settings) -> DbResult<()> {
        self.post(&[], settings, sql.to_string()).await?;
        Ok(())
    }

    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Row>> {
        let body = self
            .post(
                &[("default_format", "JSONEachRow")],
                &Settings::new(),
                sql.to_string(),
            )
            .await?;

        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<Row>(line)
                    .map_err(|e| DbError::InvalidResponse(format!("{}: {}", e, line)))
            })
            .collect()
    }

    async fn insert_rows(&self, table: &str, rows: &[Row]) -> DbResult<()> {
        let insert = format!(
            "INSERT INTO {} FORMAT JSONEachRow",
            self.dialect.quote_ident(table)
        );
        let mut body = String::new();
        for row in rows {
            body.push_str(&serde_json::Value::Object(row.clone()).to_string());
            body.push('\n');
        }
        self.post(&[("query", insert.as_str())], &Settings::new(), body)
            .await?;
        Ok(())
    }

    async fn create_database(&self, name: &str, engine: Option<&str>) -> DbResult<()> {
        let mut sql = format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            self.dialect.quote_ident(name)
        );
        if let Some(engine) = engine {
            sql.push_str(&format!(" ENGINE = {}", engine));
        }
        self.post(&[], &Self::ddl_settings(), sql).await?;
        Ok(())
    }

    async fn create_ledger_table(&self) -> DbResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
              uid UUID DEFAULT generateUUIDv4(),
              version UInt32,
              checksum String,
              migration_name String,
              applied_at DateTime DEFAULT now()
            )
            ENGINE = MergeTree
            ORDER BY tuple(applied_at)",
            LEDGER_TABLE
        );
        self.post(&[], &Self::ddl_settings(), sql).await?;
        Ok(())
    }

    fn dialect(&self) -> &dyn SqlDialect {
        &self.dialect
    }

    fn db_type(&self) -> &'static str {
        "clickhouse"
    }

    fn close(self: Box<Self>) -> DbResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "clickhouse_test.rs"]
mod tests;
