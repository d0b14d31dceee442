//! Ledger model: the record of applied migrations
//!
//! The ledger lives in the `_migrations` table of the target database. Rows
//! are decoded into strict [`LedgerEntry`] records and collected into an
//! immutable [`Ledger`] snapshot keyed by version.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the tracking table
pub const LEDGER_TABLE: &str = "_migrations";

/// A generic result row: column name to JSON value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// One applied migration as recorded in the ledger.
///
/// `uid` and `applied_at` are filled by column defaults in the store and are
/// never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerEntry {
    /// Migration version
    pub version: u32,

    /// Hex MD5 of the migration text at apply time
    pub checksum: String,

    /// File name of the migration at apply time
    pub migration_name: String,
}

impl LedgerEntry {
    /// Decode a single result row, rejecting rows of any other shape
    pub fn from_row(row: Row) -> CoreResult<Self> {
        let value = serde_json::Value::Object(row);
        serde_json::from_value(value.clone()).map_err(|e| CoreError::InvalidLedgerRow {
            row: value.to_string(),
            message: e.to_string(),
        })
    }

    /// Encode as a row for insertion
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("version".to_string(), self.version.into());
        row.insert("checksum".to_string(), self.checksum.clone().into());
        row.insert(
            "migration_name".to_string(),
            self.migration_name.clone().into(),
        );
        row
    }
}

/// Immutable snapshot of the ledger, keyed by version
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: BTreeMap<u32, LedgerEntry>,
}

impl Ledger {
    /// Build a ledger from decoded entries.
    ///
    /// Repeated rows for one version are tolerated only when they carry the
    /// same checksum.
    pub fn from_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> CoreResult<Self> {
        let mut map: BTreeMap<u32, LedgerEntry> = BTreeMap::new();
        for entry in entries {
            match map.get(&entry.version) {
                Some(existing) if existing.checksum != entry.checksum => {
                    return Err(CoreError::ConflictingLedgerEntries {
                        version: entry.version,
                        first: existing.migration_name.clone(),
                        second: entry.migration_name,
                    });
                }
                Some(existing) => {
                    log::warn!(
                        "The _migrations table records {} (version {}) more than once",
                        existing.migration_name,
                        entry.version
                    );
                }
                None => {
                    map.insert(entry.version, entry);
                }
            }
        }
        Ok(Self { entries: map })
    }

    /// Decode raw result rows into a ledger
    pub fn from_rows(rows: Vec<Row>) -> CoreResult<Self> {
        let entries = rows
            .into_iter()
            .map(LedgerEntry::from_row)
            .collect::<CoreResult<Vec<_>>>()?;
        Self::from_entries(entries)
    }

    /// Look up the entry for a version
    pub fn get(&self, version: u32) -> Option<&LedgerEntry> {
        self.entries.get(&version)
    }

    /// Entries in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    /// Number of recorded versions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been applied yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
