//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// clickhouse-migrations - versioned schema migrations for ClickHouse
#[derive(Parser, Debug)]
#[command(name = "clickhouse-migrations")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// YAML config file with defaults for the migrate options
    #[arg(short, long, global = true, env = "CH_MIGRATIONS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Migrate(MigrateArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Database URL, e.g. http://localhost:8123 or duckdb:warehouse.duckdb (a file; :memory: is refused)
    #[arg(long, env = "CH_MIGRATIONS_URL")]
    pub url: Option<String>,

    /// Username
    #[arg(long, env = "CH_MIGRATIONS_USER")]
    pub user: Option<String>,

    /// Database to migrate; created if missing
    #[arg(long, env = "CH_MIGRATIONS_DB")]
    pub db: Option<String>,

    /// Directory with the migration files
    #[arg(long, env = "CH_MIGRATIONS_HOME")]
    pub migrations_home: Option<PathBuf>,

    /// Password
    #[arg(long, env = "CH_MIGRATIONS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Engine clause for the created database, e.g. "Replicated('/clickhouse/{database}', '{shard}', '{replica}')"
    #[arg(long, env = "CH_MIGRATIONS_ENGINE")]
    pub engine: Option<String>,

    /// Per-request timeout in milliseconds (0 disables it)
    #[arg(long, env = "CH_MIGRATIONS_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
