//! rowsnap Core - typed snapshot model for relational query results
//!
//! This crate provides the type-resolution, serialization and comparison
//! kernel of rowsnap:
//! - Closed set of canonical scan types and their value representations
//! - Column type resolution from driver-reported metadata
//! - ResultSet model (column types, rows, queries with comparators)
//! - Generic scanning over a driver-neutral row cursor
//! - Lossless JSON codec for result sets
//! - Structural and value comparison with per-column comparators
//!
//! Persistence and database adapters live in `rowsnap-store`; the
//! record/apply/check orchestration lives in `rowsnap-engine`.

pub mod codec;
pub mod compare;
pub mod db;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod resolver;
pub mod scan;

// Re-export commonly used types
pub use compare::{Comparator, Comparators, Diagnosis, Mismatch, MismatchKind, Verdict};
pub use db::{ColumnDescriptor, Database, RawValue, RowCursor, Statement, StatementBuilder};
pub use errors::{ExError, ExErrorKind, Result, RowsnapError};
pub use model::{ColType, Query, QuerySource, ResultSet, ResultType, Row, ScanType, Snapshot, Value};

#[doc(hidden)]
pub use rowsnap_core_types;
