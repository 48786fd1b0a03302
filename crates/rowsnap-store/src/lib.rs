//! rowsnap Store - snapshot persistence and database adapters
//!
//! Provides:
//! - Filesystem snapshot store with an ordering manifest and atomic writes
//! - Replay of table snapshots into a live database
//! - SQLite implementation of the database collaborator
//! - Dialect-aware SQL statement builder

pub mod apply;
pub mod errors;
pub mod fs;
pub mod layout;
pub mod manifest;
pub mod snapshot_store;
pub mod sql_builder;
pub mod sqlite;

// Re-export key types
pub use apply::{apply_result, apply_snapshot, ApplyOptions, ApplyStats, DEFAULT_BATCH_SIZE};
pub use errors::Result;
pub use snapshot_store::{SnapshotStore, StoreOptions, DEFAULT_ROOT};
pub use sql_builder::{Dialect, SqlBuilder};
pub use sqlite::SqliteDatabase;
