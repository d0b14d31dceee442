//! SQL dialect abstraction

use sqlparser::dialect::{
    ClickHouseDialect as SqlParserClickHouse, Dialect, DuckDbDialect as SqlParserDuckDb,
};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect used for tokenizing
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Quote an identifier for this dialect
    fn quote_ident(&self, ident: &str) -> String;

    /// Quote a string literal for this dialect
    fn quote_literal(&self, value: &str) -> String;

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// ClickHouse SQL dialect
pub struct ClickHouseDialect {
    dialect: SqlParserClickHouse,
}

impl ClickHouseDialect {
    /// Create a new ClickHouse dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserClickHouse {},
        }
    }
}

impl Default for ClickHouseDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for ClickHouseDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('\\', "\\\\").replace('"', "\\\""))
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    fn name(&self) -> &'static str {
        "clickhouse"
    }
}

/// DuckDB SQL dialect
pub struct DuckDbDialect {
    dialect: SqlParserDuckDb,
}

impl DuckDbDialect {
    /// Create a new DuckDB dialect
    pub fn new() -> Self {
        Self {
            dialect: SqlParserDuckDb {},
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for DuckDbDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
