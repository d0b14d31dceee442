//! End-to-end migration runs against an embedded DuckDB file

use chm_core::{compute_checksum, CoreError, ResolvedConfig};
use chm_db::{read_ledger, Database, DuckDbBackend};
use chm_migrate::{migrate, MigrateError};
use chm_sql::Settings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    migrations: PathBuf,
    db_file: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let migrations = tmp.path().join("migrations");
        fs::create_dir(&migrations).unwrap();
        let db_file = tmp.path().join("warehouse.duckdb");
        Self {
            _tmp: tmp,
            migrations,
            db_file,
        }
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.migrations.join(name), content).unwrap();
    }

    fn config(&self) -> ResolvedConfig {
        ResolvedConfig {
            url: format!("duckdb:{}", self.db_file.display()),
            user: "default".to_string(),
            password: None,
            db: "analytics".to_string(),
            migrations_home: self.migrations.clone(),
            engine: None,
            request_timeout: None,
        }
    }

    /// Open the database file bound to the target schema
    fn open(&self) -> DuckDbBackend {
        let db = DuckDbBackend::from_path(&self.db_file).unwrap();
        db.use_schema("analytics").unwrap();
        db
    }
}

async fn count(db: &dyn Database, table: &str) -> u64 {
    let rows = db
        .query_rows(&format!("SELECT count(*) AS n FROM {}", table))
        .await
        .unwrap();
    rows[0]["n"].as_u64().unwrap()
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn test_fresh_database_applies_everything() {
    let fx = Fixture::new();
    fx.write(
        "1_init.sql",
        "-- users\nCREATE TABLE users (id INTEGER, name VARCHAR);\n\
         INSERT INTO users VALUES (1, 'ada');",
    );
    fx.write("2_orders.sql", "CREATE TABLE orders (id INTEGER);");
    fx.write("README.md", "not a migration");

    let outcome = migrate(&fx.config()).await.unwrap();
    assert_eq!(outcome.applied, vec!["1_init.sql", "2_orders.sql"]);
    assert_eq!(outcome.skipped, 0);

    let db = fx.open();
    assert_eq!(count(&db, "users").await, 1);
    assert_eq!(count(&db, "orders").await, 0);

    let ledger = read_ledger(&db).await.unwrap();
    assert_eq!(ledger.len(), 2);
    let init = ledger.get(1).unwrap();
    assert_eq!(init.migration_name, "1_init.sql");
    assert_eq!(
        init.checksum,
        compute_checksum(&read_file(&fx.migrations.join("1_init.sql")))
    );
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let fx = Fixture::new();
    fx.write("1_init.sql", "CREATE TABLE users (id INTEGER);");

    migrate(&fx.config()).await.unwrap();
    let outcome = migrate(&fx.config()).await.unwrap();

    assert!(outcome.applied.is_empty());
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.summary(), "No migrations to apply.");

    let db = fx.open();
    assert_eq!(count(&db, "_migrations").await, 1);
}

#[tokio::test]
async fn test_new_migration_is_applied_on_next_run() {
    let fx = Fixture::new();
    fx.write("1_init.sql", "CREATE TABLE users (id INTEGER);");
    migrate(&fx.config()).await.unwrap();

    fx.write("2_more.sql", "INSERT INTO users VALUES (7);");
    let outcome = migrate(&fx.config()).await.unwrap();

    assert_eq!(outcome.applied, vec!["2_more.sql"]);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(count(&fx.open(), "users").await, 1);
}

#[tokio::test]
async fn test_edited_migration_is_drift() {
    let fx = Fixture::new();
    fx.write("1_init.sql", "CREATE TABLE users (id INTEGER);");
    migrate(&fx.config()).await.unwrap();

    fx.write("1_init.sql", "CREATE TABLE users (id BIGINT);");
    fx.write("2_more.sql", "CREATE TABLE more (id INTEGER);");
    let err = migrate(&fx.config()).await.unwrap_err();

    assert!(matches!(
        err,
        MigrateError::Core(CoreError::MigrationChanged { version: 1, .. })
    ));
    // Nothing after the drift check ran
    let ledger = read_ledger(&fx.open()).await.unwrap();
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn test_removed_migration_is_drift() {
    let fx = Fixture::new();
    fx.write("1_init.sql", "CREATE TABLE users (id INTEGER);");
    fx.write("2_more.sql", "CREATE TABLE more (id INTEGER);");
    migrate(&fx.config()).await.unwrap();

    fs::remove_file(fx.migrations.join("2_more.sql")).unwrap();
    fx.write("3_new.sql", "CREATE TABLE newer (id INTEGER);");
    let err = migrate(&fx.config()).await.unwrap_err();

    match err {
        MigrateError::Core(CoreError::MigrationRemoved { version, name }) => {
            assert_eq!(version, 2);
            assert_eq!(name, "2_more.sql");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The pending migration was never attempted
    let db = fx.open();
    let ledger = read_ledger(&db).await.unwrap();
    assert!(ledger.get(3).is_none());
    assert_eq!(ledger.len(), 2);
    assert!(db.query_rows("SELECT * FROM newer").await.is_err());
}

#[tokio::test]
async fn test_failed_statement_keeps_earlier_migrations() {
    let fx = Fixture::new();
    fx.write("4_a.sql", "CREATE TABLE a (id INTEGER);");
    fx.write(
        "5_b.sql",
        "CREATE TABLE b (id INTEGER);\nINSERT INTO does_not_exist VALUES (1);",
    );
    fx.write("6_c.sql", "CREATE TABLE c (id INTEGER);");

    let err = migrate(&fx.config()).await.unwrap_err();
    match &err {
        MigrateError::StatementFailed {
            applied, migration, ..
        } => {
            assert_eq!(applied, &vec!["4_a.sql".to_string()]);
            assert_eq!(migration, "5_b.sql");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let db = fx.open();
    let ledger = read_ledger(&db).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert!(ledger.get(4).is_some());
    // The first statement of 5 stays applied; 6 never ran
    assert_eq!(count(&db, "b").await, 0);
    assert!(db
        .query_rows("SELECT * FROM c")
        .await
        .is_err());
}

#[tokio::test]
async fn test_bad_file_name_fails_before_database_is_created() {
    let fx = Fixture::new();
    fx.write("init.sql", "CREATE TABLE users (id INTEGER);");

    let err = migrate(&fx.config()).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Core(CoreError::InvalidMigrationName { ref file }) if file == "init.sql"
    ));
    assert!(!fx.db_file.exists());
}

#[tokio::test]
async fn test_empty_directory_only_bootstraps() {
    let fx = Fixture::new();

    let outcome = migrate(&fx.config()).await.unwrap();
    assert!(outcome.applied.is_empty());

    let db = fx.open();
    assert_eq!(count(&db, "_migrations").await, 0);
}

#[tokio::test]
async fn test_manual_ledger_row_without_file_is_drift() {
    let fx = Fixture::new();
    fx.write("1_init.sql", "CREATE TABLE users (id INTEGER);");
    migrate(&fx.config()).await.unwrap();

    {
        let db = fx.open();
        db.execute(
            "INSERT INTO _migrations (version, checksum, migration_name) VALUES (9, 'x', '9_ghost.sql')",
            &Settings::new(),
        )
        .await
        .unwrap();
        Box::new(db).close().unwrap();
    }

    let err = migrate(&fx.config()).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Core(CoreError::MigrationRemoved { version: 9, .. })
    ));
}
