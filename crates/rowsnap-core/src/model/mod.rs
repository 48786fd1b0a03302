//! ResultSet model
//!
//! In-memory typed-table representation of a query or table scan:
//!
//! - [`ScanType`]: closed enumeration of canonical scan types
//! - [`Value`]: one cell, shaped by its column's scan type
//! - [`ColType`] / [`ResultType`]: column and result schemas
//! - [`ResultSet`] / [`Row`]: rows of values plus their schema
//! - [`Query`]: the query or table that produced a result, with comparators
//! - [`Snapshot`]: named, ordered collection of results for one test

pub mod col_type;
pub mod query;
pub mod result;
pub mod scan_type;
pub mod snapshot;
pub mod value;

pub use col_type::ColType;
pub use query::{Query, QuerySource};
pub use result::{ResultSet, ResultType, Row};
pub use scan_type::ScanType;
pub use snapshot::Snapshot;
pub use value::Value;
