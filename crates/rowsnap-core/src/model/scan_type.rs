//! Canonical scan types.
//!
//! Every column resolves to exactly one [`ScanType`]. The scan type decides
//! how cells are decoded from the driver, encoded into a snapshot document
//! and compared. The database type name is informational only.

use crate::errors::{Result, RowsnapError};
use crate::model::value::Value;
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Closed enumeration of canonical scan types.
///
/// Each variant has a stable tag used in snapshot documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanType {
    Text,
    NullableText,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    NullableInt64,
    Float32,
    Float64,
    NullableFloat64,
    Timestamp,
    NullableTimestamp,
    /// Uninterpreted bytes; NULL is kept distinct from an empty payload
    RawBytes,
}

impl ScanType {
    /// Every scan type, in tag-table order
    pub const ALL: [ScanType; 17] = [
        ScanType::Text,
        ScanType::NullableText,
        ScanType::Int8,
        ScanType::Int16,
        ScanType::Int32,
        ScanType::Int64,
        ScanType::UInt8,
        ScanType::UInt16,
        ScanType::UInt32,
        ScanType::UInt64,
        ScanType::NullableInt64,
        ScanType::Float32,
        ScanType::Float64,
        ScanType::NullableFloat64,
        ScanType::Timestamp,
        ScanType::NullableTimestamp,
        ScanType::RawBytes,
    ];

    /// Stable serialization tag
    pub fn tag(&self) -> &'static str {
        match self {
            ScanType::Text => "string",
            ScanType::NullableText => "null_string",
            ScanType::Int8 => "int8",
            ScanType::Int16 => "int16",
            ScanType::Int32 => "int32",
            ScanType::Int64 => "int64",
            ScanType::UInt8 => "uint8",
            ScanType::UInt16 => "uint16",
            ScanType::UInt32 => "uint32",
            ScanType::UInt64 => "uint64",
            ScanType::NullableInt64 => "null_int64",
            ScanType::Float32 => "float32",
            ScanType::Float64 => "float64",
            ScanType::NullableFloat64 => "null_float64",
            ScanType::Timestamp => "timestamp",
            ScanType::NullableTimestamp => "null_timestamp",
            ScanType::RawBytes => "raw_bytes",
        }
    }

    /// Resolve a serialization tag back to its scan type
    ///
    /// # Errors
    ///
    /// `UnsupportedType` if the tag is not part of the closed enumeration.
    pub fn from_tag(tag: &str) -> Result<Self> {
        ScanType::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == tag)
            .ok_or_else(|| RowsnapError::UnsupportedType {
                tag: tag.to_string(),
            })
    }

    /// Zero value of this scan type, used as the decode placeholder
    pub fn zero_value(&self) -> Value {
        match self {
            ScanType::Text => Value::Text(String::new()),
            ScanType::NullableText => Value::NullableText(None),
            ScanType::Int8 => Value::Int8(0),
            ScanType::Int16 => Value::Int16(0),
            ScanType::Int32 => Value::Int32(0),
            ScanType::Int64 => Value::Int64(0),
            ScanType::UInt8 => Value::UInt8(0),
            ScanType::UInt16 => Value::UInt16(0),
            ScanType::UInt32 => Value::UInt32(0),
            ScanType::UInt64 => Value::UInt64(0),
            ScanType::NullableInt64 => Value::NullableInt64(None),
            ScanType::Float32 => Value::Float32(0.0),
            ScanType::Float64 => Value::Float64(0.0),
            ScanType::NullableFloat64 => Value::NullableFloat64(None),
            ScanType::Timestamp => Value::Timestamp(DateTime::<FixedOffset>::default()),
            ScanType::NullableTimestamp => Value::NullableTimestamp(None),
            ScanType::RawBytes => Value::RawBytes(None),
        }
    }

    /// Whether a SQL NULL can be represented
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            ScanType::NullableText
                | ScanType::NullableInt64
                | ScanType::NullableFloat64
                | ScanType::NullableTimestamp
                | ScanType::RawBytes
        )
    }

    /// Whether direct equality is undefined, so a comparator must be registered
    pub fn requires_comparator(&self) -> bool {
        matches!(
            self,
            ScanType::Timestamp | ScanType::NullableTimestamp | ScanType::RawBytes
        )
    }

    /// Text scan type for the given nullability
    pub fn text(nullable: bool) -> Self {
        if nullable {
            ScanType::NullableText
        } else {
            ScanType::Text
        }
    }

    /// Timestamp scan type for the given nullability
    pub fn timestamp(nullable: bool) -> Self {
        if nullable {
            ScanType::NullableTimestamp
        } else {
            ScanType::Timestamp
        }
    }

    /// Closest scan type able to hold NULL
    ///
    /// Narrow integer widths widen to the nullable 64-bit integer and
    /// `Float32` widens to the nullable 64-bit float. `UInt64` does not fit
    /// the signed integer, so it keeps its decimal text form.
    pub fn nullable_variant(&self) -> Self {
        match self {
            ScanType::Text => ScanType::NullableText,
            ScanType::Int8
            | ScanType::Int16
            | ScanType::Int32
            | ScanType::Int64
            | ScanType::UInt8
            | ScanType::UInt16
            | ScanType::UInt32 => ScanType::NullableInt64,
            ScanType::Float32 | ScanType::Float64 => ScanType::NullableFloat64,
            ScanType::Timestamp => ScanType::NullableTimestamp,
            ScanType::UInt64 => ScanType::NullableText,
            other => *other,
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
