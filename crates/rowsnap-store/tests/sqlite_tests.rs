//! SQLite Adapter Tests
//!
//! Exercises scan, fetch and apply against an in-memory SQLite database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rowsnap_core::compare::compare_result;
use rowsnap_core::scan::fetch;
use rowsnap_core::{Comparator, Query, ScanType, Snapshot, StatementBuilder, Value};
use rowsnap_store::apply::{apply_snapshot, ApplyOptions};
use rowsnap_store::{Dialect, SqlBuilder, SqliteDatabase};
use std::sync::Arc;

fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE users (
            id INTEGER NOT NULL,
            name VARCHAR(32),
            balance DECIMAL(10,2),
            created_at DATETIME,
            avatar BLOB
        );
        INSERT INTO users VALUES (1, 'ann', '10.50', '2024-01-01 09:00:00', x'00ff');
        INSERT INTO users VALUES (2, NULL, '0.00', NULL, NULL);",
    )
    .unwrap();
    db
}

fn users_query() -> Arc<Query> {
    Arc::new(
        Query::table("users")
            .with_comparator("created_at", Comparator::TimeEqual)
            .with_comparator("avatar", Comparator::RawBytesEqual),
    )
}

#[test]
fn test_fetch_resolves_declared_types() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);

    let rs = fetch(&db, &builder.select_all("users")).unwrap();

    let types: Vec<ScanType> = rs.col_types().iter().map(|c| c.scan_type()).collect();
    assert_eq!(
        types,
        vec![
            ScanType::NullableInt64,
            ScanType::NullableText,
            ScanType::NullableText,
            ScanType::NullableTimestamp,
            ScanType::RawBytes,
        ]
    );
    assert_eq!(rs.col_types()[1].length(), Some(32));
    assert_eq!(rs.col_types()[2].precision_scale(), Some((10, 2)));

    // DECIMAL has NUMERIC affinity, so SQLite stores '10.50' as the real 10.5
    let first = rs.row(0).unwrap();
    assert_eq!(first.get("balance"), Some(&Value::NullableText(Some("10.5".to_string()))));
    assert_eq!(first.get("avatar"), Some(&Value::RawBytes(Some(vec![0x00, 0xff]))));
    assert!(rs.row(1).unwrap().get("name").unwrap().is_null());
}

#[test]
fn test_query_arguments_are_bound() {
    let db = setup_db();
    let stmt = rowsnap_core::Statement::new("SELECT name FROM users WHERE id = ?")
        .with_args(vec![Value::Int64(1)]);
    let rs = fetch(&db, &stmt).unwrap();
    assert_eq!(rs.len(), 1);
    assert_eq!(rs.data()[0][0], Value::NullableText(Some("ann".to_string())));
}

#[test]
fn test_apply_restores_recorded_rows() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let recorded = fetch(&db, &builder.select_all("users"))
        .unwrap()
        .with_query(users_query());

    db.execute_batch(
        "DELETE FROM users WHERE id = 1;
        INSERT INTO users VALUES (3, 'zed', '1.00', NULL, NULL);",
    )
    .unwrap();

    let snap = Snapshot::new("t", "initial", vec![recorded.clone()]);
    apply_snapshot(&db, &builder, &snap, &ApplyOptions { batch_size: 1, atomic: true }).unwrap();

    let replayed = fetch(&db, &builder.select_all("users")).unwrap();
    assert!(compare_result(&recorded, &replayed).unwrap().is_match());
}

#[test]
fn test_apply_replays_wide_table_with_default_options() {
    let db = SqliteDatabase::open_in_memory().unwrap();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let columns: Vec<String> = (0..40).map(|i| format!("c{} INTEGER NOT NULL", i)).collect();
    db.execute_batch(&format!("CREATE TABLE wide ({});", columns.join(", "))).unwrap();
    let values: Vec<String> = (0..40).map(|i| i.to_string()).collect();
    let insert = format!("INSERT INTO wide VALUES ({});", values.join(", "));
    db.execute_batch(&insert.repeat(1000)).unwrap();

    let recorded = fetch(&db, &builder.select_all("wide"))
        .unwrap()
        .with_query(Arc::new(Query::table("wide")));
    assert_eq!(recorded.len(), 1000);
    db.execute_batch("DELETE FROM wide;").unwrap();

    let snap = Snapshot::new("t", "initial", vec![recorded.clone()]);
    let stats = apply_snapshot(&db, &builder, &snap, &ApplyOptions::default()).unwrap();

    // 32766 / 40 = 819 rows per statement
    assert_eq!(stats.statements, 3);
    let replayed = fetch(&db, &builder.select_all("wide")).unwrap();
    assert!(compare_result(&recorded, &replayed).unwrap().is_match());
}
