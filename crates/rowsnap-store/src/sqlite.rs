//! SQLite implementation of the database collaborator
//!
//! Column descriptors come from declared column types. SQLite does not
//! report nullability for query columns, so it is left undeclared.
//! Default scan types follow SQLite's type-affinity rules and are always
//! the nullable variant, since SQLite accepts NULL in any undeclared column.

use crate::errors::{from_rusqlite, Result};
use rowsnap_core::errors::ExError;
use rowsnap_core::model::value::format_timestamp;
use rowsnap_core::{ColumnDescriptor, Database, RawValue, RowCursor, ScanType, Statement, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Rows};
use std::path::Path;

/// [`Database`] over a `rusqlite::Connection`
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Connection::open(path)
            .map(Self::from_connection)
            .map_err(|e| ExError::from(from_rusqlite(e)).with_op("open_database"))
    }

    /// Open a private in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Connection::open_in_memory()
            .map(Self::from_connection)
            .map_err(|e| ExError::from(from_rusqlite(e)).with_op("open_database"))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a batch of `;`-separated statements without parameters
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| ExError::from(from_rusqlite(e)).with_op("execute_batch"))
    }
}

impl Database for SqliteDatabase {
    fn query(
        &self,
        stmt: &Statement,
        visit: &mut dyn FnMut(&mut dyn RowCursor) -> rowsnap_core::Result<()>,
    ) -> rowsnap_core::Result<()> {
        let mut prepared = self.conn.prepare(&stmt.sql).map_err(from_rusqlite)?;
        let columns: Vec<ColumnDescriptor> = prepared
            .columns()
            .iter()
            .map(|c| describe(c.name(), c.decl_type()))
            .collect();
        let params: Vec<SqlValue> = stmt.args.iter().map(to_sql_value).collect();
        let rows = prepared
            .query(params_from_iter(params.iter()))
            .map_err(from_rusqlite)?;

        let mut cursor = SqliteCursor { columns, rows };
        visit(&mut cursor)
    }

    fn exec(&self, stmt: &Statement) -> rowsnap_core::Result<u64> {
        let params: Vec<SqlValue> = stmt.args.iter().map(to_sql_value).collect();
        self.conn
            .execute(&stmt.sql, params_from_iter(params.iter()))
            .map(|n| n as u64)
            .map_err(from_rusqlite)
    }
}

struct SqliteCursor<'stmt> {
    columns: Vec<ColumnDescriptor>,
    rows: Rows<'stmt>,
}

impl RowCursor for SqliteCursor<'_> {
    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn next_row(&mut self) -> rowsnap_core::Result<Option<Vec<RawValue>>> {
        let width = self.columns.len();
        let Some(row) = self.rows.next().map_err(from_rusqlite)? else {
            return Ok(None);
        };
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(to_raw(row.get_ref(i).map_err(from_rusqlite)?));
        }
        Ok(Some(cells))
    }
}

/// Build a descriptor from a column's declared type
///
/// `VARCHAR(255)` yields type `VARCHAR` with length 255; `DECIMAL(10,2)`
/// yields precision 10 and scale 2. Expression columns have no declared
/// type and scan as nullable text.
pub fn describe(name: &str, decl_type: Option<&str>) -> ColumnDescriptor {
    let Some(full) = decl_type.map(str::trim) else {
        return ColumnDescriptor::new(name, "").with_default_scan_type(ScanType::NullableText);
    };

    let (base, args) = match full.split_once('(') {
        Some((base, rest)) => {
            let inner = rest.trim_end().trim_end_matches(')');
            let args: Vec<i64> = inner
                .split(',')
                .filter_map(|a| a.trim().parse().ok())
                .collect();
            (base.trim().to_ascii_uppercase(), args)
        }
        None => (full.to_ascii_uppercase(), Vec::new()),
    };

    let mut desc = ColumnDescriptor::new(name, base.clone())
        .with_full_database_type(full)
        .with_default_scan_type(affinity_scan_type(&base));
    match (is_numeric_precision(&base), args.as_slice()) {
        (true, [p]) => desc = desc.with_precision_scale(*p, 0),
        (true, [p, s, ..]) => desc = desc.with_precision_scale(*p, *s),
        (false, [len, ..]) => desc = desc.with_length(*len),
        _ => {}
    }
    desc
}

fn is_numeric_precision(base: &str) -> bool {
    matches!(base, "DECIMAL" | "NUMERIC")
}

// https://www.sqlite.org/datatype3.html#determination_of_column_affinity
fn affinity_scan_type(base: &str) -> ScanType {
    if base.contains("INT") {
        ScanType::NullableInt64
    } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
        ScanType::NullableText
    } else if base.is_empty() || base.contains("BLOB") {
        ScanType::RawBytes
    } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        ScanType::NullableFloat64
    } else if base.contains("BOOL") {
        ScanType::NullableInt64
    } else {
        // NUMERIC affinity: keep the stored text exactly
        ScanType::NullableText
    }
}

fn to_raw(value: ValueRef<'_>) -> RawValue {
    match value {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(i) => RawValue::Integer(i),
        ValueRef::Real(f) => RawValue::Float(f),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(s) => RawValue::Text(s.to_string()),
            Err(_) => RawValue::Bytes(t.to_vec()),
        },
        ValueRef::Blob(b) => RawValue::Bytes(b.to_vec()),
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Text(s) | Value::NullableText(Some(s)) => SqlValue::Text(s.clone()),
        Value::Int8(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int16(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int32(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int64(v) | Value::NullableInt64(Some(v)) => SqlValue::Integer(*v),
        Value::UInt8(v) => SqlValue::Integer(i64::from(*v)),
        Value::UInt16(v) => SqlValue::Integer(i64::from(*v)),
        Value::UInt32(v) => SqlValue::Integer(i64::from(*v)),
        Value::UInt64(v) => match i64::try_from(*v) {
            Ok(i) => SqlValue::Integer(i),
            Err(_) => SqlValue::Text(v.to_string()),
        },
        Value::Float32(v) => SqlValue::Real(f64::from(*v)),
        Value::Float64(v) | Value::NullableFloat64(Some(v)) => SqlValue::Real(*v),
        Value::Timestamp(t) | Value::NullableTimestamp(Some(t)) => {
            SqlValue::Text(format_timestamp(t))
        }
        Value::RawBytes(Some(b)) => SqlValue::Blob(b.clone()),
        Value::NullableText(None)
        | Value::NullableInt64(None)
        | Value::NullableFloat64(None)
        | Value::NullableTimestamp(None)
        | Value::RawBytes(None) => SqlValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_varchar_length() {
        let d = describe("name", Some("VARCHAR(255)"));
        assert_eq!(d.database_type, "VARCHAR");
        assert_eq!(d.full_database_type, "VARCHAR(255)");
        assert_eq!(d.length, Some(255));
        assert_eq!(d.nullable, None);
    }

    #[test]
    fn test_describe_decimal_precision_scale() {
        let d = describe("price", Some("decimal(10, 2)"));
        assert_eq!(d.database_type, "DECIMAL");
        assert_eq!(d.precision_scale, Some((10, 2)));
        assert_eq!(d.length, None);
    }

    #[test]
    fn test_affinity_defaults() {
        let cases = [
            ("INTEGER", ScanType::NullableInt64),
            ("UNSIGNED BIG INT", ScanType::NullableInt64),
            ("CLOB", ScanType::NullableText),
            ("BLOB", ScanType::RawBytes),
            ("", ScanType::RawBytes),
            ("DOUBLE PRECISION", ScanType::NullableFloat64),
            ("BOOLEAN", ScanType::NullableInt64),
            ("NUMERIC", ScanType::NullableText),
        ];
        for (decl, expected) in cases {
            assert_eq!(
                describe("c", Some(decl)).default_scan_type,
                Some(expected),
                "{}",
                decl
            );
        }
    }

    #[test]
    fn test_expression_column_is_nullable_text() {
        let d = describe("count(*)", None);
        assert_eq!(d.default_scan_type, Some(ScanType::NullableText));
    }

    #[test]
    fn test_text_with_invalid_utf8_becomes_bytes() {
        assert_eq!(to_raw(ValueRef::Text(&[0xff, 0xfe])), RawValue::Bytes(vec![0xff, 0xfe]));
    }
}
