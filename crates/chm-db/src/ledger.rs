//! Reading and appending the `_migrations` ledger

use crate::error::DbResult;
use crate::traits::Database;
use chm_core::{Ledger, LedgerEntry, LEDGER_TABLE};

/// Load every ledger row, ordered by version, into an immutable snapshot
pub async fn read_ledger(db: &dyn Database) -> DbResult<Ledger> {
    let sql = format!(
        "SELECT version, checksum, migration_name FROM {} ORDER BY version",
        LEDGER_TABLE
    );
    let rows = db.query_rows(&sql).await?;
    log::debug!("Read {} row(s) from {}", rows.len(), LEDGER_TABLE);
    Ok(Ledger::from_rows(rows)?)
}

/// Append one applied migration to the ledger
pub async fn record_migration(db: &dyn Database, entry: &LedgerEntry) -> DbResult<()> {
    db.insert_rows(LEDGER_TABLE, &[entry.to_row()]).await
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
