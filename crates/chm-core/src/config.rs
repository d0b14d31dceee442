//! Run configuration
//!
//! Values come from three layers: command-line flags, `CH_MIGRATIONS_*`
//! environment variables (both resolved by the CLI) and an optional YAML
//! config file. Flags and environment win over the file.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Partially specified configuration, as read from a file or the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database URL, e.g. `http://clickhouse:8123` or `duckdb:analytics.duckdb`
    pub url: Option<String>,

    /// Username
    pub user: Option<String>,

    /// Password
    pub password: Option<String>,

    /// Target database name
    pub db: Option<String>,

    /// Directory holding the migration files
    pub migrations_home: Option<PathBuf>,

    /// Engine clause for the create-database step
    pub engine: Option<String>,

    /// Per-request timeout in milliseconds
    pub request_timeout: Option<u64>,
}

/// Fully resolved configuration for a migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub url: String,
    pub user: String,
    pub password: Option<String>,
    pub db: String,
    pub migrations_home: PathBuf,
    pub engine: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A relative `migrations_home` is resolved against the file's directory.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        if let (Some(home), Some(parent)) = (&config.migrations_home, path.parent()) {
            if home.is_relative() {
                config.migrations_home = Some(parent.join(home));
            }
        }
        Ok(config)
    }

    /// Layer `overrides` on top of `self`; set values in `overrides` win
    pub fn merge(self, overrides: Config) -> Config {
        Config {
            url: overrides.url.or(self.url),
            user: overrides.user.or(self.user),
            password: overrides.password.or(self.password),
            db: overrides.db.or(self.db),
            migrations_home: overrides.migrations_home.or(self.migrations_home),
            engine: overrides.engine.or(self.engine),
            request_timeout: overrides.request_timeout.or(self.request_timeout),
        }
    }

    /// Check required values are present and produce a [`ResolvedConfig`]
    pub fn resolve(self) -> CoreResult<ResolvedConfig> {
        let url = required(self.url, "url", "CH_MIGRATIONS_URL")?;
        let user = required(self.user, "user", "CH_MIGRATIONS_USER")?;
        let db = required(self.db, "db", "CH_MIGRATIONS_DB")?;
        let migrations_home = self
            .migrations_home
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| missing("migrations-home", "CH_MIGRATIONS_HOME"))?;

        Ok(ResolvedConfig {
            url,
            user,
            password: self.password.filter(|p| !p.is_empty()),
            db,
            migrations_home,
            engine: self.engine.filter(|e| !e.trim().is_empty()),
            request_timeout: self
                .request_timeout
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        })
    }
}

fn required(value: Option<String>, flag: &str, env: &str) -> CoreResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing(flag, env))
}

fn missing(flag: &str, env: &str) -> CoreError {
    CoreError::ConfigInvalid {
        message: format!("required option '--{flag}' not specified (or set {env})"),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
