//! Backend selection from the connection URL

use crate::clickhouse::ClickHouseBackend;
use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::traits::Database;
use chm_core::ResolvedConfig;
use std::time::Duration;

/// URL prefix selecting the embedded DuckDB backend
pub const DUCKDB_SCHEME: &str = "duckdb:";

/// Connection parameters shared by every session of a run
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// `http(s)://host:port` for ClickHouse, `duckdb:<path>` for DuckDB
    pub url: String,
    pub user: String,
    pub password: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl From<&ResolvedConfig> for ConnectionConfig {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            url: config.url.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            request_timeout: config.request_timeout,
        }
    }
}

/// Open a session, optionally bound to `database`
pub fn connect(config: &ConnectionConfig, database: Option<&str>) -> DbResult<Box<dyn Database>> {
    if let Some(path) = config.url.strip_prefix(DUCKDB_SCHEME) {
        let path = path.trim_start_matches("//");
        if path.is_empty() || path == ":memory:" {
            return Err(DbError::DuckDbPathRequired(config.url.clone()));
        }
        if config.password.is_some() {
            log::warn!("DuckDB has no authentication; ignoring password");
        }
        let backend = DuckDbBackend::new(path)?;
        if let Some(schema) = database {
            backend.use_schema(schema)?;
        }
        log::debug!("Opened DuckDB database at {}", path);
        return Ok(Box::new(backend));
    }

    if config.url.starts_with("http://") || config.url.starts_with("https://") {
        let backend = ClickHouseBackend::new(config, database)?;
        log::debug!(
            "ClickHouse client for {} (database: {})",
            config.url,
            database.unwrap_or("default")
        );
        return Ok(Box::new(backend));
    }

    Err(DbError::UnsupportedUrl(config.url.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ConnectionConfig {
        ConnectionConfig {
            url: url.to_string(),
            user: "default".to_string(),
            password: None,
            request_timeout: Some(Duration::from_millis(500)),
        }
    }

    #[test]
    fn test_http_url_selects_clickhouse() {
        let db = connect(&config("http://localhost:8123"), Some("analytics")).unwrap();
        assert_eq!(db.db_type(), "clickhouse");
        assert_eq!(db.dialect().name(), "clickhouse");
    }

    #[test]
    fn test_duckdb_url_selects_duckdb() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("duckdb:{}", dir.path().join("t.duckdb").display());
        let db = connect(&config(&url), None).unwrap();
        assert_eq!(db.db_type(), "duckdb");
        db.close().unwrap();
    }

    #[test]
    fn test_duckdb_in_memory_is_rejected() {
        for url in ["duckdb::memory:", "duckdb://:memory:", "duckdb:"] {
            let err = connect(&config(url), None).err().unwrap();
            assert!(matches!(err, DbError::DuckDbPathRequired(ref u) if u == url));
        }
    }

    #[test]
    fn test_duckdb_url_with_slashes() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("duckdb://{}", dir.path().join("t.duckdb").display());
        let db = connect(&config(&url), None).unwrap();
        assert_eq!(db.db_type(), "duckdb");
    }

    #[test]
    fn test_unknown_scheme() {
        let err = connect(&config("postgres://localhost"), None).err().unwrap();
        assert!(matches!(err, DbError::UnsupportedUrl(_)));
    }

    #[test]
    fn test_duckdb_missing_schema_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("duckdb:{}", dir.path().join("t.duckdb").display());
        let err = connect(&config(&url), Some("nope")).err().unwrap();
        assert!(matches!(err, DbError::ExecutionError(_)));
    }
}
