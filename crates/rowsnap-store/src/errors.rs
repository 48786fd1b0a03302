//! Error handling for rowsnap-store
//!
//! Wraps rowsnap-core ExError with store-specific helpers

use rowsnap_core::errors::{ExError, ExErrorKind, RowsnapError};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a query error from rusqlite::Error
///
/// Returns the core error so database adapters can satisfy the collaborator traits.
pub fn from_rusqlite(err: rusqlite::Error) -> RowsnapError {
    RowsnapError::query(err.to_string())
}

/// Snapshot directory already exists and overwrite was not requested
pub fn already_exists(path: &Path) -> ExError {
    ExError::from(RowsnapError::AlreadyExists {
        path: path.display().to_string(),
    })
    .with_op("save_snapshot")
}

/// Snapshot directory does not exist
pub fn not_found(path: &Path) -> ExError {
    ExError::from(RowsnapError::NotFound {
        path: path.display().to_string(),
    })
    .with_op("load_snapshot")
}

/// Snapshot directory contents disagree with its manifest
pub fn corrupt_snapshot(path: &Path, reason: impl Into<String>) -> ExError {
    ExError::from(RowsnapError::CorruptSnapshot {
        path: path.display().to_string(),
        reason: reason.into(),
    })
    .with_op("load_snapshot")
}

/// Caller-supplied value rejected before any side effect
pub fn invalid_input(operation: &str, reason: impl Into<String>) -> ExError {
    ExError::from(RowsnapError::InvalidInput {
        reason: reason.into(),
    })
    .with_op(operation.to_string())
}
