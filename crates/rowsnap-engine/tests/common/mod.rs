//! Shared fixtures for harness tests

#![allow(dead_code)]

use rowsnap_core::scan::fetch;
use rowsnap_core::{Statement, Value};
use rowsnap_engine::HarnessConfig;
use rowsnap_store::{SqliteDatabase, StoreOptions};
use tempfile::TempDir;

pub fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE users (id INTEGER NOT NULL, name TEXT);
        INSERT INTO users VALUES (1, 'ann'), (2, 'bob'), (3, NULL);
        CREATE TABLE events (id INTEGER NOT NULL, created_at DATETIME);
        INSERT INTO events VALUES (1, '2020-01-01 00:00:00');",
    )
    .unwrap();
    db
}

/// Harness config rooted in a fresh temporary directory
pub fn setup_config() -> (HarnessConfig, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = HarnessConfig {
        store: StoreOptions {
            root: temp_dir.path().to_path_buf(),
        },
        ..HarnessConfig::default()
    };
    (config, temp_dir)
}

pub fn user_names(db: &SqliteDatabase) -> Vec<Option<String>> {
    let result = fetch(db, &Statement::new("SELECT name FROM users ORDER BY id")).unwrap();
    result
        .data()
        .iter()
        .map(|row| match &row[0] {
            Value::NullableText(name) => name.clone(),
            other => panic!("unexpected value {:?}", other),
        })
        .collect()
}
