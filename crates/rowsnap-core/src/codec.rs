//! Lossless JSON codec for result sets
//!
//! Document shape:
//!
//! ```json
//! {
//!   "name": "users",
//!   "isTable": true,
//!   "cols": [{ "name": "id", "databaseType": "INTEGER", "scanType": "int64", ... }],
//!   "data": [[1], [2]]
//! }
//! ```
//!
//! Scan types are written as tags, never as runtime type names. Decoding
//! allocates each column's zero value and fills it, so a decoded result is
//! indistinguishable from a freshly scanned one.

use crate::errors::{Result, RowsnapError};
use crate::model::{ColType, ResultSet, ResultType, ScanType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColDoc {
    name: String,
    database_type: String,
    full_database_type: String,
    nullable: bool,
    has_nullable: bool,
    length: i64,
    has_length: bool,
    precision: i64,
    scale: i64,
    has_precision_scale: bool,
    scan_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultDoc {
    name: String,
    is_table: bool,
    cols: Vec<ColDoc>,
    data: Vec<Vec<serde_json::Value>>,
}

impl From<&ColType> for ColDoc {
    fn from(c: &ColType) -> Self {
        let (precision, scale) = c.precision_scale().unwrap_or_default();
        ColDoc {
            name: c.name().to_string(),
            database_type: c.database_type().to_string(),
            full_database_type: c.full_database_type().to_string(),
            nullable: c.nullable().unwrap_or_default(),
            has_nullable: c.nullable().is_some(),
            length: c.length().unwrap_or_default(),
            has_length: c.length().is_some(),
            precision,
            scale,
            has_precision_scale: c.precision_scale().is_some(),
            scan_type: c.scan_type().tag().to_string(),
        }
    }
}

impl ColDoc {
    fn into_col_type(self) -> Result<ColType> {
        let scan_type = ScanType::from_tag(&self.scan_type)?;
        let mut col = ColType::new(self.name, self.database_type, scan_type)
            .with_full_database_type(self.full_database_type);
        if self.has_nullable {
            col = col.with_nullable(self.nullable);
        }
        if self.has_length {
            col = col.with_length(self.length);
        }
        if self.has_precision_scale {
            col = col.with_precision_scale(self.precision, self.scale);
        }
        Ok(col)
    }
}

/// Encode a result set as a pretty-printed JSON document
///
/// The producing query is not part of the document.
///
/// # Errors
///
/// `Serialization` if JSON encoding fails.
pub fn marshal(result: &ResultSet) -> Result<Vec<u8>> {
    let doc = ResultDoc {
        name: result.name().to_string(),
        is_table: result.is_table(),
        cols: result.col_types().iter().map(ColDoc::from).collect(),
        data: result
            .data()
            .iter()
            .map(|row| row.iter().map(|v| v.to_json()).collect())
            .collect(),
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Decode a document produced by [`marshal`]
///
/// # Errors
///
/// `UnsupportedType` for an unknown scan-type tag, `Serialization` for
/// malformed JSON, a row of the wrong width, or a cell that does not fit
/// its column.
pub fn unmarshal(bytes: &[u8]) -> Result<ResultSet> {
    let doc: ResultDoc = serde_json::from_slice(bytes)?;
    let col_types = doc
        .cols
        .into_iter()
        .map(ColDoc::into_col_type)
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(doc.data.len());
    for (i, cells) in doc.data.iter().enumerate() {
        if cells.len() != col_types.len() {
            return Err(RowsnapError::serialization(format!(
                "row {} has {} cells for {} columns",
                i,
                cells.len(),
                col_types.len()
            )));
        }
        let mut row = Vec::with_capacity(col_types.len());
        for (cell, col) in cells.iter().zip(&col_types) {
            let mut value = col.scan_type().zero_value();
            value.fill_from_json(cell).map_err(|e| match e {
                RowsnapError::Serialization { message } => RowsnapError::serialization(format!(
                    "row {}, column {}: {}",
                    i,
                    col.name(),
                    message
                )),
                other => other,
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    Ok(ResultSet::from_parts(
        ResultType::new(doc.name, doc.is_table, col_types),
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[test]
    fn test_document_uses_tags_and_camel_case() {
        let rt = ResultType::new(
            "t",
            true,
            vec![ColType::new("s", "VARCHAR", ScanType::NullableText).with_length(20)],
        );
        let rs = ResultSet::new(rt, vec![vec![Value::NullableText(None)]]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&marshal(&rs).unwrap()).unwrap();
        assert_eq!(json["isTable"], true);
        assert_eq!(json["cols"][0]["scanType"], "null_string");
        assert_eq!(json["cols"][0]["hasLength"], true);
        assert_eq!(json["data"][0][0], serde_json::Value::Null);
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let doc = br#"{"name":"t","isTable":false,"cols":[{"name":"a","databaseType":"X","fullDatabaseType":"X","nullable":false,"hasNullable":false,"length":0,"hasLength":false,"precision":0,"scale":0,"hasPrecisionScale":false,"scanType":"reflect.Value"}],"data":[]}"#;
        assert!(matches!(
            unmarshal(doc).unwrap_err(),
            RowsnapError::UnsupportedType { ref tag } if tag == "reflect.Value"
        ));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let doc = br#"{"name":"t","isTable":false,"cols":[{"name":"a","databaseType":"X","fullDatabaseType":"X","nullable":false,"hasNullable":false,"length":0,"hasLength":false,"precision":0,"scale":0,"hasPrecisionScale":false,"scanType":"int64"}],"data":[[]]}"#;
        assert!(matches!(
            unmarshal(doc).unwrap_err(),
            RowsnapError::Serialization { .. }
        ));
    }
}
