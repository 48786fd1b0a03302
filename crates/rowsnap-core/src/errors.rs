use thiserror::Error;

/// Result type alias using RowsnapError
pub type Result<T> = std::result::Result<T, RowsnapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in rowsnap. Each kind maps to a stable error code that can be used for
/// programmatic error handling, testing, and reporting from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input/Validation
    InvalidInput,
    InvalidName,
    NotFound,
    AlreadyExists,
    NotATable,

    // Type resolution / decoding
    UnsupportedType,
    Query,
    Scan,

    // Comparison
    StructuralMismatch,
    ValueMismatch,
    /// A raw-bytes or timestamp column was compared without a registered comparator
    MissingComparator,

    // Storage
    /// Snapshot manifest disagrees with the files on disk
    CorruptSnapshot,
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::NotATable => "ERR_NOT_A_TABLE",
            ExErrorKind::UnsupportedType => "ERR_UNSUPPORTED_TYPE",
            ExErrorKind::Query => "ERR_QUERY",
            ExErrorKind::Scan => "ERR_SCAN",
            ExErrorKind::StructuralMismatch => "ERR_STRUCTURAL_MISMATCH",
            ExErrorKind::ValueMismatch => "ERR_VALUE_MISMATCH",
            ExErrorKind::MissingComparator => "ERR_MISSING_COMPARATOR",
            ExErrorKind::CorruptSnapshot => "ERR_CORRUPT_SNAPSHOT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (snapshot path, result or table name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for rowsnap core operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowsnapError {
    // ===== Database collaborator =====
    /// Query execution failed in the database collaborator
    #[error("Query failed: {message}")]
    Query { message: String },

    /// Column metadata unreadable, or a value could not be decoded
    #[error("Scan failed: {message}")]
    Scan { message: String },

    // ===== Type resolution =====
    /// Scan type tag is not part of the closed enumeration, or no scan type
    /// could be resolved for a driver column
    #[error("Unsupported scan type: {tag}")]
    UnsupportedType { tag: String },

    // ===== Comparison =====
    /// Column count or schema differs between expected and actual
    #[error("Structural mismatch: {diagnostic}")]
    StructuralMismatch { diagnostic: String },

    /// A row-level comparator reported inequality
    #[error("Value mismatch: {diagnostic}")]
    ValueMismatch { diagnostic: String },

    /// Column type has no default equality and no comparator was registered
    #[error("Column {column} has scan type {scan_type}, which requires a registered comparator")]
    MissingComparator { column: String, scan_type: String },

    // ===== Snapshot storage =====
    /// Snapshot already exists and overwrite was not requested
    #[error("Snapshot already exists: {path}")]
    AlreadyExists { path: String },

    /// Snapshot or result could not be found
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Apply was requested for a result that was not produced by a table scan
    #[error("Result {result} is not a table")]
    NotATable { result: String },

    /// Manifest and files on disk disagree
    #[error("Corrupt snapshot at {path}: {reason}")]
    CorruptSnapshot { path: String, reason: String },

    // ===== Validation =====
    /// Snapshot, query or test name is not usable as a path segment
    #[error("Invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Generic invalid input
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // ===== Integration =====
    /// Filesystem failure
    #[error("IO error: {message}")]
    Io { message: String },

    /// Document or manifest (de)serialization failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl RowsnapError {
    /// Canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            RowsnapError::Query { .. } => ExErrorKind::Query,
            RowsnapError::Scan { .. } => ExErrorKind::Scan,
            RowsnapError::UnsupportedType { .. } => ExErrorKind::UnsupportedType,
            RowsnapError::StructuralMismatch { .. } => ExErrorKind::StructuralMismatch,
            RowsnapError::ValueMismatch { .. } => ExErrorKind::ValueMismatch,
            RowsnapError::MissingComparator { .. } => ExErrorKind::MissingComparator,
            RowsnapError::AlreadyExists { .. } => ExErrorKind::AlreadyExists,
            RowsnapError::NotFound { .. } => ExErrorKind::NotFound,
            RowsnapError::NotATable { .. } => ExErrorKind::NotATable,
            RowsnapError::CorruptSnapshot { .. } => ExErrorKind::CorruptSnapshot,
            RowsnapError::InvalidName { .. } => ExErrorKind::InvalidName,
            RowsnapError::InvalidInput { .. } => ExErrorKind::InvalidInput,
            RowsnapError::Io { .. } => ExErrorKind::Io,
            RowsnapError::Serialization { .. } => ExErrorKind::Serialization,
        }
    }

    /// Shorthand for a scan failure
    pub fn scan(message: impl Into<String>) -> Self {
        RowsnapError::Scan {
            message: message.into(),
        }
    }

    /// Shorthand for a query failure
    pub fn query(message: impl Into<String>) -> Self {
        RowsnapError::Query {
            message: message.into(),
        }
    }

    /// Shorthand for a serialization failure
    pub fn serialization(message: impl Into<String>) -> Self {
        RowsnapError::Serialization {
            message: message.into(),
        }
    }
}

impl From<RowsnapError> for ExError {
    fn from(err: RowsnapError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let ex = ExError::new(kind).with_message(message);
        match err {
            RowsnapError::MissingComparator { column, .. } => ex.with_entity_id(column),
            RowsnapError::AlreadyExists { path }
            | RowsnapError::NotFound { path }
            | RowsnapError::CorruptSnapshot { path, .. } => ex.with_entity_id(path),
            RowsnapError::NotATable { result } => ex.with_entity_id(result),
            RowsnapError::InvalidName { name, .. } => ex.with_entity_id(name),
            _ => ex,
        }
    }
}

impl From<serde_json::Error> for RowsnapError {
    fn from(err: serde_json::Error) -> Self {
        RowsnapError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for RowsnapError {
    fn from(err: std::io::Error) -> Self {
        RowsnapError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::UnsupportedType, "ERR_UNSUPPORTED_TYPE"),
            (ExErrorKind::StructuralMismatch, "ERR_STRUCTURAL_MISMATCH"),
            (ExErrorKind::ValueMismatch, "ERR_VALUE_MISMATCH"),
            (ExErrorKind::AlreadyExists, "ERR_ALREADY_EXISTS"),
            (ExErrorKind::NotATable, "ERR_NOT_A_TABLE"),
            (ExErrorKind::MissingComparator, "ERR_MISSING_COMPARATOR"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_not_a_table_converts_with_entity() {
        let err = RowsnapError::NotATable {
            result: "select_max".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::NotATable);
        assert_eq!(ex.entity_id(), Some("select_max"));
        assert!(ex.message().contains("select_max"));
    }

    #[test]
    fn test_display_includes_code_and_op() {
        let ex = ExError::new(ExErrorKind::Io)
            .with_op("save_snapshot")
            .with_message("disk full");
        let rendered = ex.to_string();
        assert!(rendered.starts_with("[ERR_IO]"));
        assert!(rendered.contains("save_snapshot"));
        assert!(rendered.contains("disk full"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        let inner = ExError::new(ExErrorKind::Serialization).with_message("bad json");
        let outer = ExError::new(ExErrorKind::CorruptSnapshot).with_source(inner);
        assert_eq!(
            outer.source_error().map(|s| s.kind()),
            Some(ExErrorKind::Serialization)
        );
        assert!(std::error::Error::source(&outer).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RowsnapError = io.into();
        assert_eq!(err.kind(), ExErrorKind::Io);
    }
}
