//! Dialect-aware SQL statement builder
//!
//! Identifiers are always quoted; values are always bound as `?`
//! parameters.

use rowsnap_core::errors::{Result, RowsnapError};
use rowsnap_core::{Statement, StatementBuilder, Value};

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    /// Bound parameter limit per statement: SQLite's
    /// `SQLITE_MAX_VARIABLE_NUMBER` and MySQL's prepared statement cap
    pub fn max_params(self) -> usize {
        match self {
            Dialect::MySql => 65_535,
            Dialect::Sqlite => 32_766,
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Sqlite => '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlBuilder {
    dialect: Dialect,
}

impl SqlBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Quote an identifier; `schema.table` quotes each part
    pub fn quote_ident(&self, ident: &str) -> String {
        let q = self.dialect.quote_char();
        let escaped = format!("{}{}", q, q);
        ident
            .split('.')
            .map(|part| format!("{}{}{}", q, part.replace(q, &escaped), q))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl StatementBuilder for SqlBuilder {
    fn select_all(&self, table: &str) -> Statement {
        Statement::new(format!("SELECT * FROM {}", self.quote_ident(table)))
    }

    fn truncate(&self, table: &str) -> Statement {
        let table = self.quote_ident(table);
        match self.dialect {
            Dialect::MySql => Statement::new(format!("TRUNCATE TABLE {}", table)),
            // SQLite has no TRUNCATE
            Dialect::Sqlite => Statement::new(format!("DELETE FROM {}", table)),
        }
    }

    fn insert(&self, table: &str, columns: &[&str], rows: &[Vec<Value>]) -> Result<Statement> {
        if columns.is_empty() {
            return Err(RowsnapError::InvalidInput {
                reason: format!("insert into {} without columns", table),
            });
        }
        if rows.is_empty() {
            return Err(RowsnapError::InvalidInput {
                reason: format!("insert into {} without rows", table),
            });
        }

        let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
        let mut args = Vec::with_capacity(rows.len() * columns.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(RowsnapError::InvalidInput {
                    reason: format!(
                        "row {} for {} has {} values for {} columns",
                        i,
                        table,
                        row.len(),
                        columns.len()
                    ),
                });
            }
            args.extend(row.iter().cloned());
        }

        let column_list = columns
            .iter()
            .map(|c| self.quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.quote_ident(table),
            column_list,
            vec![placeholders.as_str(); rows.len()].join(", ")
        );
        Ok(Statement::new(sql).with_args(args))
    }

    fn max_params(&self) -> usize {
        self.dialect.max_params()
    }
}
