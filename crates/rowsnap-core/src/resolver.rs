//! Column type resolution
//!
//! Maps driver-reported column metadata onto a canonical [`ScanType`].
//! Character and decimal types always scan as text so decimals keep their
//! exact digits. Date-time types scan as timestamps. Everything else uses
//! the driver's suggested scan type, widened to its nullable variant when
//! the column may hold NULL.

use crate::db::ColumnDescriptor;
use crate::errors::{Result, RowsnapError};
use crate::model::{ColType, ScanType};

/// Resolve the canonical scan type for a descriptor
///
/// Undeclared nullability resolves to the nullable variant.
///
/// # Errors
///
/// `UnsupportedType` if the type is not special-cased and the driver
/// offers no default scan type.
pub fn resolve_scan_type(desc: &ColumnDescriptor) -> Result<ScanType> {
    let nullable = desc.nullable.unwrap_or(true);
    match desc.database_type.to_ascii_uppercase().as_str() {
        "CHAR" | "VARCHAR" | "TEXT" | "DECIMAL" => Ok(ScanType::text(nullable)),
        "TIMESTAMP" | "DATETIME" => Ok(ScanType::timestamp(nullable)),
        _ => {
            let default = desc
                .default_scan_type
                .ok_or_else(|| RowsnapError::UnsupportedType {
                    tag: desc.database_type.clone(),
                })?;
            Ok(if nullable {
                default.nullable_variant()
            } else {
                default
            })
        }
    }
}

impl ColType {
    /// Build a column type from live driver metadata
    ///
    /// # Errors
    ///
    /// `UnsupportedType` as for [`resolve_scan_type`].
    pub fn resolve(desc: &ColumnDescriptor) -> Result<ColType> {
        let scan_type = resolve_scan_type(desc)?;
        let mut col = ColType::new(desc.name.clone(), desc.database_type.clone(), scan_type)
            .with_full_database_type(desc.full_database_type.clone());
        if let Some(nullable) = desc.nullable {
            col = col.with_nullable(nullable);
        }
        if let Some(length) = desc.length {
            col = col.with_length(length);
        }
        if let Some((precision, scale)) = desc.precision_scale {
            col = col.with_precision_scale(precision, scale);
        }
        Ok(col)
    }
}
