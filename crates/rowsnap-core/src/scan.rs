//! Generic scanning of a live cursor into a [`ResultSet`]

use crate::db::{Database, RowCursor, Statement};
use crate::errors::{Result, RowsnapError};
use crate::model::{ColType, ResultSet, ResultType};

/// Drain a cursor into an unnamed result set
///
/// Column types are resolved once from the cursor's descriptors; each cell
/// is decoded into its column's zero value.
///
/// # Errors
///
/// `UnsupportedType` if a column cannot be resolved, `Scan` if a cell does
/// not fit its column, or whatever the cursor reports while stepping.
pub fn scan(cursor: &mut dyn RowCursor) -> Result<ResultSet> {
    let col_types = cursor
        .columns()
        .iter()
        .map(ColType::resolve)
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    while let Some(raw_row) = cursor.next_row()? {
        if raw_row.len() != col_types.len() {
            return Err(RowsnapError::scan(format!(
                "cursor yielded {} cells for {} columns",
                raw_row.len(),
                col_types.len()
            )));
        }
        let mut row = Vec::with_capacity(col_types.len());
        for (raw, col) in raw_row.into_iter().zip(&col_types) {
            let mut value = col.scan_type().zero_value();
            value.fill_from_raw(raw).map_err(|e| match e {
                RowsnapError::Scan { message } => {
                    RowsnapError::scan(format!("column {}: {}", col.name(), message))
                }
                other => other,
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    Ok(ResultSet::from_parts(
        ResultType::new(String::new(), false, col_types),
        rows,
    ))
}

/// Run a statement and scan everything it returns
///
/// # Errors
///
/// As for [`Database::query`] and [`scan`].
pub fn fetch(db: &dyn Database, stmt: &Statement) -> Result<ResultSet> {
    let mut out = None;
    db.query(stmt, &mut |cursor: &mut dyn RowCursor| {
        out = Some(scan(cursor)?);
        Ok(())
    })?;
    out.ok_or_else(|| RowsnapError::query(format!("no cursor returned for {:?}", stmt.sql)))
}
