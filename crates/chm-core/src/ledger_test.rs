use super::*;
use serde_json::json;

fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn entry(version: u32, checksum: &str, name: &str) -> LedgerEntry {
    LedgerEntry {
        version,
        checksum: checksum.to_string(),
        migration_name: name.to_string(),
    }
}

#[test]
fn test_from_rows() {
    let ledger = Ledger::from_rows(vec![
        row(json!({"version": 1, "checksum": "aa", "migration_name": "1_init.sql"})),
        row(json!({"version": 3, "checksum": "cc", "migration_name": "3_x.sql"})),
    ])
    .unwrap();

    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.get(3).unwrap().migration_name, "3_x.sql");
    assert!(ledger.get(2).is_none());
    let versions: Vec<u32> = ledger.iter().map(|e| e.version).collect();
    assert_eq!(versions, vec![1, 3]);
}

#[test]
fn test_rejects_unknown_columns() {
    let err = Ledger::from_rows(vec![row(json!({
        "version": 1,
        "checksum": "aa",
        "migration_name": "1_init.sql",
        "extra": true
    }))])
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidLedgerRow { .. }));
}

#[test]
fn test_rejects_wrong_types() {
    let err = Ledger::from_rows(vec![row(json!({
        "version": "one",
        "checksum": "aa",
        "migration_name": "1_init.sql"
    }))])
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidLedgerRow { .. }));

    let err = Ledger::from_rows(vec![row(json!({"version": 1, "checksum": "aa"}))]).unwrap_err();
    assert!(matches!(err, CoreError::InvalidLedgerRow { .. }));
}

#[test]
fn test_rejects_negative_version() {
    let err = Ledger::from_rows(vec![row(json!({
        "version": -4,
        "checksum": "aa",
        "migration_name": "x.sql"
    }))])
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidLedgerRow { .. }));
}

#[test]
fn test_repeated_identical_entries_are_collapsed() {
    let ledger = Ledger::from_entries(vec![
        entry(2, "bb", "2_y.sql"),
        entry(2, "bb", "2_y.sql"),
    ])
    .unwrap();
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_conflicting_entries_fail() {
    let err = Ledger::from_entries(vec![entry(2, "bb", "2_y.sql"), entry(2, "zz", "2_z.sql")])
        .unwrap_err();
    match err {
        CoreError::ConflictingLedgerEntries {
            version,
            first,
            second,
        } => {
            assert_eq!(version, 2);
            assert_eq!(first, "2_y.sql");
            assert_eq!(second, "2_z.sql");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_to_row_decodes_back() {
    let original = entry(7, "abc", "7_seven.sql");
    let decoded = LedgerEntry::from_row(original.to_row()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_empty_ledger() {
    let ledger = Ledger::from_rows(Vec::new()).unwrap();
    assert!(ledger.is_empty());
}
