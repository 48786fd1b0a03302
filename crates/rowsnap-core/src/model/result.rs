use crate::compare::Comparators;
use crate::errors::{Result, RowsnapError};
use crate::model::{ColType, Query, Value};
use std::sync::Arc;

/// Schema of a result: name, table flag and ordered columns
///
/// Column order is part of identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultType {
    pub name: String,
    pub is_table: bool,
    pub col_types: Vec<ColType>,
}

impl ResultType {
    pub fn new(name: impl Into<String>, is_table: bool, col_types: Vec<ColType>) -> Self {
        Self {
            name: name.into(),
            is_table,
            col_types,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.col_types.iter().map(|c| c.name()).collect()
    }
}

/// Borrowed view of one row, sharing its result's schema
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub result_type: &'a ResultType,
    pub values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Value of the named column
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.result_type
            .col_types
            .iter()
            .position(|c| c.name() == column)
            .and_then(|i| self.values.get(i))
    }
}

/// Rows of values plus their schema and originating query
#[derive(Debug, Clone)]
pub struct ResultSet {
    result_type: ResultType,
    query: Option<Arc<Query>>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Build a result set, checking every row against the schema
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a row's width differs from the column count or a
    /// value's scan type differs from its column's.
    pub fn new(result_type: ResultType, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != result_type.col_types.len() {
                return Err(RowsnapError::InvalidInput {
                    reason: format!(
                        "row {} of {} has {} values for {} columns",
                        i,
                        result_type.name,
                        row.len(),
                        result_type.col_types.len()
                    ),
                });
            }
            for (value, col) in row.iter().zip(&result_type.col_types) {
                if value.scan_type() != col.scan_type() {
                    return Err(RowsnapError::InvalidInput {
                        reason: format!(
                            "row {} of {}: column {} expects {}, got {}",
                            i,
                            result_type.name,
                            col.name(),
                            col.scan_type(),
                            value.scan_type()
                        ),
                    });
                }
            }
        }
        Ok(Self::from_parts(result_type, rows))
    }

    /// Build without validation; callers guarantee the row invariants
    pub(crate) fn from_parts(result_type: ResultType, rows: Vec<Vec<Value>>) -> Self {
        Self {
            result_type,
            query: None,
            rows,
        }
    }

    pub fn result_type(&self) -> &ResultType {
        &self.result_type
    }

    pub fn name(&self) -> &str {
        &self.result_type.name
    }

    pub fn is_table(&self) -> bool {
        self.result_type.is_table
    }

    pub fn col_types(&self) -> &[ColType] {
        &self.result_type.col_types
    }

    /// Row count
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `i`, `None` past the end
    pub fn row(&self, i: usize) -> Option<Row<'_>> {
        self.rows.get(i).map(|values| Row {
            result_type: &self.result_type,
            values,
        })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            result_type: &self.result_type,
            values,
        })
    }

    /// Raw row values, in cursor order
    pub fn data(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_deref()
    }

    /// Attach the producing query; also renames and flags the result to match it
    pub fn with_query(mut self, query: Arc<Query>) -> Self {
        self.result_type.name = query.name().to_string();
        self.result_type.is_table = query.is_table();
        self.query = Some(query);
        self
    }

    /// Comparators registered on the producing query, if any
    pub fn comparators(&self) -> Option<&Comparators> {
        self.query.as_deref().map(Query::comparators)
    }
}
