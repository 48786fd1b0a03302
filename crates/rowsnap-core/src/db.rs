//! Database collaborator contracts.
//!
//! The core never opens connections. It consumes a [`Database`] that runs
//! statements and hands back a [`RowCursor`], plus a [`StatementBuilder`]
//! that knows the target dialect.

use crate::errors::Result;
use crate::model::{ScanType, Value};
use chrono::{DateTime, FixedOffset};

/// Driver-reported metadata for one result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Type name without modifiers, e.g. `VARCHAR`
    pub database_type: String,
    /// Type name as declared, e.g. `VARCHAR(255)`
    pub full_database_type: String,
    /// `None` when the driver cannot tell
    pub nullable: Option<bool>,
    pub length: Option<i64>,
    pub precision_scale: Option<(i64, i64)>,
    /// Scan type the driver would pick for types the resolver does not special-case
    pub default_scan_type: Option<ScanType>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, database_type: impl Into<String>) -> Self {
        let database_type = database_type.into();
        Self {
            name: name.into(),
            full_database_type: database_type.clone(),
            database_type,
            nullable: None,
            length: None,
            precision_scale: None,
            default_scan_type: None,
        }
    }

    pub fn with_full_database_type(mut self, full: impl Into<String>) -> Self {
        self.full_database_type = full.into();
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_length(mut self, length: i64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_precision_scale(mut self, precision: i64, scale: i64) -> Self {
        self.precision_scale = Some((precision, scale));
        self
    }

    pub fn with_default_scan_type(mut self, scan_type: ScanType) -> Self {
        self.default_scan_type = Some(scan_type);
        self
    }
}

/// Driver-neutral cell yielded by a cursor
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Integer(i64),
    /// Unsigned integers above `i64::MAX`
    UInteger(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
}

impl RawValue {
    /// Short name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Null => "NULL",
            RawValue::Integer(_) => "integer",
            RawValue::UInteger(_) => "unsigned integer",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
            RawValue::Bytes(_) => "bytes",
            RawValue::Timestamp(_) => "timestamp",
        }
    }
}

/// Parameterised SQL plus its positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

/// Forward-only cursor over a running query
pub trait RowCursor {
    /// Column metadata, stable for the life of the cursor
    fn columns(&self) -> &[ColumnDescriptor];

    /// Next row's cells, or `None` once exhausted
    ///
    /// # Errors
    ///
    /// `Query` if the driver fails while stepping.
    fn next_row(&mut self) -> Result<Option<Vec<RawValue>>>;
}

/// Statement execution
///
/// Cursors borrow driver state, so queries hand the cursor to a visitor
/// instead of returning it.
pub trait Database {
    /// Run a query and pass its cursor to `visit`
    ///
    /// # Errors
    ///
    /// `Query` on driver failure, or whatever `visit` returns.
    fn query(
        &self,
        stmt: &Statement,
        visit: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()>;

    /// Run a statement, returning the affected row count
    ///
    /// # Errors
    ///
    /// `Query` on driver failure.
    fn exec(&self, stmt: &Statement) -> Result<u64>;

    /// # Errors
    ///
    /// `Query` on driver failure.
    fn begin(&self) -> Result<()> {
        self.exec(&Statement::new("BEGIN")).map(|_| ())
    }

    /// # Errors
    ///
    /// `Query` on driver failure.
    fn commit(&self) -> Result<()> {
        self.exec(&Statement::new("COMMIT")).map(|_| ())
    }

    /// # Errors
    ///
    /// `Query` on driver failure.
    fn rollback(&self) -> Result<()> {
        self.exec(&Statement::new("ROLLBACK")).map(|_| ())
    }
}

/// Dialect-aware statement construction
pub trait StatementBuilder {
    /// `SELECT *` over a whole table
    fn select_all(&self, table: &str) -> Statement;

    /// Statement that empties a table
    fn truncate(&self, table: &str) -> Statement;

    /// One multi-row INSERT for a batch
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the batch is empty or a row's width differs from `columns`.
    fn insert(&self, table: &str, columns: &[&str], rows: &[Vec<Value>]) -> Result<Statement>;

    /// Most bound parameters one statement may carry
    fn max_params(&self) -> usize;
}
