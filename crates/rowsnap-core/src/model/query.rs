use crate::compare::{Comparator, Comparators};

/// Where a query's rows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// Arbitrary SQL
    Sql(String),
    /// Every row of the named table
    Table,
}

/// A named query plus its per-column comparators
///
/// For `QuerySource::Table` the query name is the table name.
#[derive(Debug, Clone)]
pub struct Query {
    name: String,
    source: QuerySource,
    comparators: Comparators,
}

impl Query {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: QuerySource::Sql(sql.into()),
            comparators: Comparators::new(),
        }
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: QuerySource::Table,
            comparators: Comparators::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &QuerySource {
        &self.source
    }

    pub fn is_table(&self) -> bool {
        matches!(self.source, QuerySource::Table)
    }

    pub fn comparators(&self) -> &Comparators {
        &self.comparators
    }

    /// Register (or replace) the comparator for a column
    pub fn register_comparator(&mut self, column: impl Into<String>, comparator: Comparator) {
        self.comparators.insert(column.into(), comparator);
    }

    pub fn with_comparator(mut self, column: impl Into<String>, comparator: Comparator) -> Self {
        self.register_comparator(column, comparator);
        self
    }
}
