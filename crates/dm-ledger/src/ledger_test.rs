//! Tests for the ledger store against an in-memory DuckDB.

use super::*;
use dm_db::DuckDbBackend;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────────────

fn write_migration(dir: &Path, filename: &str, sql: &str, scope: Option<&str>) -> MigrationDescriptor {
    fs::write(dir.join(filename), sql).unwrap();
    MigrationDescriptor::parse(dir, filename, scope).unwrap()
}

fn setup() -> (TempDir, DuckDbBackend) {
    (tempfile::tempdir().unwrap(), DuckDbBackend::in_memory().unwrap())
}

async fn row_count(db: &DuckDbBackend, table: &str) -> usize {
    db.query(&format!("SELECT name FROM {table}"), &[])
        .await
        .unwrap()
        .len()
}

// ── Schema bootstrap ───────────────────────────────────────────────────

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let (_dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();
    ledger.ensure_schema().await.unwrap();
    assert_eq!(row_count(&db, "migrations.migrations").await, 0);
}

#[tokio::test]
async fn ensure_schema_uses_configured_names() {
    let (_dir, db) = setup();
    let config = MigrationConfig {
        database: "ops".to_string(),
        table: "ledger".to_string(),
        ..Default::default()
    };
    let ledger = LedgerStore::new(&db, &config);
    assert_eq!(ledger.qualified_table(), "ops.ledger");
    ledger.ensure_schema().await.unwrap();
    assert_eq!(row_count(&db, "ops.ledger").await, 0);
}

#[tokio::test]
async fn ensure_schema_records_storage_policy() {
    let (_dir, db) = setup();
    let config = MigrationConfig {
        storage_policy: Some("tiered".to_string()),
        ..Default::default()
    };
    LedgerStore::new(&db, &config).ensure_schema().await.unwrap();

    let rows = db
        .query(
            "SELECT comment FROM duckdb_tables() WHERE schema_name = 'migrations' AND table_name = 'migrations'",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rows[0].get(0), Some("storage_policy=tiered"));
}

// ── Record / lookup / check ────────────────────────────────────────────

#[tokio::test]
async fn record_then_lookup() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let m = write_migration(dir.path(), "2024-01-01_10-20-30_init.up.sql", "SELECT 1;", None);
    assert!(ledger.lookup(&m).await.unwrap().is_none());

    let entry = LedgerEntry::for_migration(&m, "abc123");
    ledger.record(&entry).await.unwrap();

    let found = ledger.lookup(&m).await.unwrap().unwrap();
    assert_eq!(found, entry);
    assert_eq!(found.scope, "");
}

#[tokio::test]
async fn check_reports_three_states() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let sql = "CREATE TABLE a (id INT);";
    let m = write_migration(dir.path(), "2024-01-01_00-00-00_a.up.sql", sql, None);
    assert_eq!(ledger.check(&m).await.unwrap(), AppliedState::NotApplied);
    assert!(!ledger.is_applied(&m).await.unwrap());

    let checksum = dm_core::compute_checksum(sql.as_bytes());
    ledger
        .record(&LedgerEntry::for_migration(&m, checksum.clone()))
        .await
        .unwrap();
    assert_eq!(ledger.check(&m).await.unwrap(), AppliedState::AppliedMatching);
    assert!(ledger.is_applied(&m).await.unwrap());

    fs::write(&m.path, "CREATE TABLE a (id BIGINT);").unwrap();
    match ledger.check(&m).await.unwrap() {
        AppliedState::AppliedMismatched { recorded, current } => {
            assert_eq!(recorded, checksum);
            assert_ne!(current, checksum);
        }
        other => panic!("expected AppliedMismatched, got {other:?}"),
    }
    assert!(matches!(
        ledger.is_applied(&m).await,
        Err(LedgerError::ChecksumMismatch { .. })
    ));
}

#[tokio::test]
async fn check_of_applied_migration_with_deleted_file_is_io_error() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let m = write_migration(dir.path(), "2024-01-01_00-00-00_a.up.sql", "SELECT 1;", None);
    ledger
        .record(&LedgerEntry::for_migration(&m, "x"))
        .await
        .unwrap();
    fs::remove_file(&m.path).unwrap();

    assert!(matches!(
        ledger.check(&m).await,
        Err(LedgerError::Core(dm_core::CoreError::IoWithPath { .. }))
    ));
}

#[tokio::test]
async fn duplicate_record_is_rejected_by_primary_key() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let m = write_migration(dir.path(), "2024-01-01_00-00-00_a.up.sql", "SELECT 1;", None);
    let entry = LedgerEntry::for_migration(&m, "x");
    ledger.record(&entry).await.unwrap();
    assert!(matches!(
        ledger.record(&entry).await,
        Err(LedgerError::LedgerWrite { .. })
    ));
}

#[tokio::test]
async fn record_without_schema_is_ledger_write_error() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    let m = write_migration(dir.path(), "2024-01-01_00-00-00_a.up.sql", "SELECT 1;", None);
    match ledger.record(&LedgerEntry::for_migration(&m, "x")).await {
        Err(LedgerError::LedgerWrite { migration, .. }) => {
            assert_eq!(migration, "2024-01-01_00-00-00_a.up.sql")
        }
        other => panic!("expected LedgerWrite, got {other:?}"),
    }
}

// ── Scope isolation ────────────────────────────────────────────────────

#[tokio::test]
async fn scopes_do_not_see_each_other() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let filename = "2024-01-01_00-00-00_shared.up.sql";
    fs::write(dir.path().join(filename), "SELECT 1;").unwrap();
    let a = MigrationDescriptor::parse(dir.path(), filename, Some("a")).unwrap();
    let b = MigrationDescriptor::parse(dir.path(), filename, Some("b")).unwrap();
    let unscoped = MigrationDescriptor::parse(dir.path(), filename, None).unwrap();

    ledger
        .record(&LedgerEntry::for_migration(&a, "x"))
        .await
        .unwrap();

    assert!(ledger.lookup(&a).await.unwrap().is_some());
    assert!(ledger.lookup(&b).await.unwrap().is_none());
    assert!(ledger.lookup(&unscoped).await.unwrap().is_none());

    assert_eq!(ledger.entries(Some("a")).await.unwrap().len(), 1);
    assert!(ledger.entries(Some("b")).await.unwrap().is_empty());
    assert!(ledger.entries(None).await.unwrap().is_empty());
}

// ── Remove ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_deletes_only_that_row() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let a = write_migration(dir.path(), "2024-01-01_00-00-00_a.up.sql", "SELECT 1;", None);
    let b = write_migration(dir.path(), "2024-01-02_00-00-00_b.up.sql", "SELECT 2;", None);
    for m in [&a, &b] {
        ledger
            .record(&LedgerEntry::for_migration(m, "x"))
            .await
            .unwrap();
    }

    ledger.remove(&a).await.unwrap();
    assert!(ledger.lookup(&a).await.unwrap().is_none());
    assert!(ledger.lookup(&b).await.unwrap().is_some());
}

#[tokio::test]
async fn remove_missing_row_is_not_applied() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let m = write_migration(dir.path(), "2024-01-01_00-00-00_a.up.sql", "SELECT 1;", None);
    assert!(matches!(
        ledger.remove(&m).await,
        Err(LedgerError::NotApplied { .. })
    ));
}

#[tokio::test]
async fn entries_are_ordered_by_datetime() {
    let (dir, db) = setup();
    let ledger = LedgerStore::new(&db, &MigrationConfig::default());
    ledger.ensure_schema().await.unwrap();

    let later = write_migration(dir.path(), "2024-05-01_00-00-00_later.up.sql", "", None);
    let earlier = write_migration(dir.path(), "2024-01-01_00-00-00_earlier.up.sql", "", None);
    for m in [&later, &earlier] {
        ledger
            .record(&LedgerEntry::for_migration(m, "x"))
            .await
            .unwrap();
    }

    let names: Vec<String> = ledger
        .entries(None)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["earlier", "later"]);
}

// ── Row decoding ───────────────────────────────────────────────────────

#[test]
fn decode_row_rejects_bad_timestamp() {
    let row = Row::new(vec![
        Some("not a time".to_string()),
        Some("a".to_string()),
        Some(String::new()),
        Some("x".to_string()),
    ]);
    assert!(matches!(decode_row(&row), Err(LedgerError::MalformedRow(_))));
}

#[test]
fn decode_row_rejects_null_column() {
    let row = Row::new(vec![
        Some("2024-01-01 00:00:00".to_string()),
        None,
        Some(String::new()),
        Some("x".to_string()),
    ]);
    assert!(matches!(decode_row(&row), Err(LedgerError::MalformedRow(_))));
}
