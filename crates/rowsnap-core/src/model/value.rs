//! Cell values.
//!
//! A [`Value`] variant corresponds one-to-one with a [`ScanType`]. Decoding
//! always starts from the column's zero value (see [`ScanType::zero_value`])
//! and fills it in place, so a value read back from a snapshot document has
//! exactly the shape a fresh scan would have produced.

use crate::db::RawValue;
use crate::errors::{Result, RowsnapError};
use crate::model::scan_type::ScanType;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value as Json;
use std::fmt;

const NAN: &str = "NaN";
const POS_INF: &str = "Infinity";
const NEG_INF: &str = "-Infinity";

/// One cell of a result set
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    NullableText(Option<String>),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    NullableInt64(Option<i64>),
    Float32(f32),
    Float64(f64),
    NullableFloat64(Option<f64>),
    Timestamp(DateTime<FixedOffset>),
    NullableTimestamp(Option<DateTime<FixedOffset>>),
    RawBytes(Option<Vec<u8>>),
}

impl Value {
    /// Scan type this value is shaped for
    pub fn scan_type(&self) -> ScanType {
        match self {
            Value::Text(_) => ScanType::Text,
            Value::NullableText(_) => ScanType::NullableText,
            Value::Int8(_) => ScanType::Int8,
            Value::Int16(_) => ScanType::Int16,
            Value::Int32(_) => ScanType::Int32,
            Value::Int64(_) => ScanType::Int64,
            Value::UInt8(_) => ScanType::UInt8,
            Value::UInt16(_) => ScanType::UInt16,
            Value::UInt32(_) => ScanType::UInt32,
            Value::UInt64(_) => ScanType::UInt64,
            Value::NullableInt64(_) => ScanType::NullableInt64,
            Value::Float32(_) => ScanType::Float32,
            Value::Float64(_) => ScanType::Float64,
            Value::NullableFloat64(_) => ScanType::NullableFloat64,
            Value::Timestamp(_) => ScanType::Timestamp,
            Value::NullableTimestamp(_) => ScanType::NullableTimestamp,
            Value::RawBytes(_) => ScanType::RawBytes,
        }
    }

    /// Whether this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::NullableText(None)
                | Value::NullableInt64(None)
                | Value::NullableFloat64(None)
                | Value::NullableTimestamp(None)
                | Value::RawBytes(None)
        )
    }

    /// Instant carried by a timestamp value, if any
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(t) | Value::NullableTimestamp(Some(t)) => Some(t),
            _ => None,
        }
    }

    /// Payload of a raw-bytes value, if any
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::RawBytes(Some(b)) => Some(b),
            _ => None,
        }
    }

    /// Decode a driver cell into this placeholder, keeping its variant
    ///
    /// # Errors
    ///
    /// `Scan` if the cell cannot be represented by this value's scan type
    /// (NULL in a non-nullable column, out-of-range integer, bad text).
    pub fn fill_from_raw(&mut self, raw: RawValue) -> Result<()> {
        let target = self.scan_type();
        let mismatch = |raw: &RawValue| {
            RowsnapError::scan(format!("cannot decode {} into {}", raw.kind_name(), target))
        };

        match self {
            Value::Text(slot) => *slot = raw_to_text(raw, target)?,
            Value::NullableText(slot) => {
                *slot = match raw {
                    RawValue::Null => None,
                    other => Some(raw_to_text(other, target)?),
                }
            }
            Value::Int8(slot) => *slot = narrow(raw_to_i64(raw, target)?, target)?,
            Value::Int16(slot) => *slot = narrow(raw_to_i64(raw, target)?, target)?,
            Value::Int32(slot) => *slot = narrow(raw_to_i64(raw, target)?, target)?,
            Value::Int64(slot) => *slot = raw_to_i64(raw, target)?,
            Value::UInt8(slot) => *slot = narrow(raw_to_u64(raw, target)?, target)?,
            Value::UInt16(slot) => *slot = narrow(raw_to_u64(raw, target)?, target)?,
            Value::UInt32(slot) => *slot = narrow(raw_to_u64(raw, target)?, target)?,
            Value::UInt64(slot) => *slot = raw_to_u64(raw, target)?,
            Value::NullableInt64(slot) => {
                *slot = match raw {
                    RawValue::Null => None,
                    other => Some(raw_to_i64(other, target)?),
                }
            }
            Value::Float32(slot) => *slot = raw_to_f64(raw, target)? as f32,
            Value::Float64(slot) => *slot = raw_to_f64(raw, target)?,
            Value::NullableFloat64(slot) => {
                *slot = match raw {
                    RawValue::Null => None,
                    other => Some(raw_to_f64(other, target)?),
                }
            }
            Value::Timestamp(slot) => *slot = raw_to_timestamp(raw, target)?,
            Value::NullableTimestamp(slot) => {
                *slot = match raw {
                    RawValue::Null => None,
                    other => Some(raw_to_timestamp(other, target)?),
                }
            }
            Value::RawBytes(slot) => {
                *slot = match raw {
                    RawValue::Null => None,
                    RawValue::Bytes(b) => Some(b),
                    RawValue::Text(s) => Some(s.into_bytes()),
                    RawValue::Integer(i) => Some(i.to_string().into_bytes()),
                    RawValue::UInteger(u) => Some(u.to_string().into_bytes()),
                    RawValue::Float(f) => Some(f.to_string().into_bytes()),
                    ref other @ RawValue::Timestamp(_) => return Err(mismatch(other)),
                }
            }
        }
        Ok(())
    }

    /// Decode a document cell into this placeholder, keeping its variant
    ///
    /// # Errors
    ///
    /// `Serialization` if the JSON cell does not match this value's scan type.
    pub fn fill_from_json(&mut self, json: &Json) -> Result<()> {
        let target = self.scan_type();
        let bad = || {
            RowsnapError::serialization(format!("expected {} value, got {}", target, json))
        };

        match self {
            Value::Text(slot) => *slot = json.as_str().ok_or_else(bad)?.to_string(),
            Value::NullableText(slot) => {
                *slot = match json {
                    Json::Null => None,
                    Json::String(s) => Some(s.clone()),
                    _ => return Err(bad()),
                }
            }
            Value::Int8(slot) => *slot = narrow_json(json.as_i64().ok_or_else(bad)?, target)?,
            Value::Int16(slot) => *slot = narrow_json(json.as_i64().ok_or_else(bad)?, target)?,
            Value::Int32(slot) => *slot = narrow_json(json.as_i64().ok_or_else(bad)?, target)?,
            Value::Int64(slot) => *slot = json.as_i64().ok_or_else(bad)?,
            Value::UInt8(slot) => *slot = narrow_json(json.as_u64().ok_or_else(bad)?, target)?,
            Value::UInt16(slot) => *slot = narrow_json(json.as_u64().ok_or_else(bad)?, target)?,
            Value::UInt32(slot) => *slot = narrow_json(json.as_u64().ok_or_else(bad)?, target)?,
            Value::UInt64(slot) => *slot = json.as_u64().ok_or_else(bad)?,
            Value::NullableInt64(slot) => {
                *slot = match json {
                    Json::Null => None,
                    other => Some(other.as_i64().ok_or_else(bad)?),
                }
            }
            Value::Float32(slot) => *slot = json_to_f64(json).ok_or_else(bad)? as f32,
            Value::Float64(slot) => *slot = json_to_f64(json).ok_or_else(bad)?,
            Value::NullableFloat64(slot) => {
                *slot = match json {
                    Json::Null => None,
                    other => Some(json_to_f64(other).ok_or_else(bad)?),
                }
            }
            Value::Timestamp(slot) => *slot = json_to_timestamp(json).ok_or_else(bad)?,
            Value::NullableTimestamp(slot) => {
                *slot = match json {
                    Json::Null => None,
                    other => Some(json_to_timestamp(other).ok_or_else(bad)?),
                }
            }
            Value::RawBytes(slot) => {
                *slot = match json {
                    Json::Null => None,
                    Json::String(s) => Some(BASE64.decode(s).map_err(|e| {
                        RowsnapError::serialization(format!("invalid base64 in raw_bytes: {}", e))
                    })?),
                    _ => return Err(bad()),
                }
            }
        }
        Ok(())
    }

    /// Encode this value as a document cell
    pub fn to_json(&self) -> Json {
        match self {
            Value::Text(s) => Json::String(s.clone()),
            Value::NullableText(o) => o.clone().map_or(Json::Null, Json::String),
            Value::Int8(v) => Json::from(*v),
            Value::Int16(v) => Json::from(*v),
            Value::Int32(v) => Json::from(*v),
            Value::Int64(v) => Json::from(*v),
            Value::UInt8(v) => Json::from(*v),
            Value::UInt16(v) => Json::from(*v),
            Value::UInt32(v) => Json::from(*v),
            Value::UInt64(v) => Json::from(*v),
            Value::NullableInt64(o) => o.map_or(Json::Null, Json::from),
            Value::Float32(v) => f64_to_json(f64::from(*v)),
            Value::Float64(v) => f64_to_json(*v),
            Value::NullableFloat64(o) => o.map_or(Json::Null, f64_to_json),
            Value::Timestamp(t) => Json::String(format_timestamp(t)),
            Value::NullableTimestamp(o) => o
                .as_ref()
                .map_or(Json::Null, |t| Json::String(format_timestamp(t))),
            Value::RawBytes(o) => o
                .as_ref()
                .map_or(Json::Null, |b| Json::String(BASE64.encode(b))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Text(s) | Value::NullableText(Some(s)) => write!(f, "{:?}", s),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) | Value::NullableInt64(Some(v)) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) | Value::NullableFloat64(Some(v)) => write!(f, "{}", v),
            Value::Timestamp(t) | Value::NullableTimestamp(Some(t)) => {
                f.write_str(&format_timestamp(t))
            }
            Value::RawBytes(Some(bytes)) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            _ => f.write_str("NULL"),
        }
    }
}

/// Canonical text form of a timestamp (RFC 3339, offset kept, sub-second digits as needed)
///
/// Years outside 0000..=9999 are written with a sign (`+10000-01-01T...`),
/// which [`parse_canonical_timestamp`] reads back.
pub fn format_timestamp(t: &DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parse the output of [`format_timestamp`], signed extended years included
pub fn parse_canonical_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, EXTENDED_YEAR_FORMAT))
        .ok()
}

// RFC 3339 layout whose %Y takes a sign and more than four digits
const EXTENDED_YEAR_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Parse the timestamp spellings drivers commonly hand back as text
///
/// RFC 3339 keeps its offset; offset-less forms are read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Some(t) = parse_canonical_timestamp(s) {
        return Some(t);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

fn raw_to_text(raw: RawValue, target: ScanType) -> Result<String> {
    match raw {
        RawValue::Text(s) => Ok(s),
        RawValue::Bytes(b) => String::from_utf8(b).map_err(|e| {
            RowsnapError::scan(format!("{} column holds non-UTF-8 bytes: {}", target, e))
        }),
        RawValue::Integer(i) => Ok(i.to_string()),
        RawValue::UInteger(u) => Ok(u.to_string()),
        RawValue::Float(f) => Ok(f.to_string()),
        RawValue::Timestamp(t) => Ok(format_timestamp(&t)),
        RawValue::Null => Err(null_in(target)),
    }
}

fn raw_to_i64(raw: RawValue, target: ScanType) -> Result<i64> {
    match raw {
        RawValue::Integer(i) => Ok(i),
        RawValue::UInteger(u) => i64::try_from(u).map_err(|_| out_of_range(u, target)),
        RawValue::Text(s) => parse_number(&s, target),
        RawValue::Bytes(b) => parse_number(&String::from_utf8_lossy(&b), target),
        RawValue::Null => Err(null_in(target)),
        other => Err(RowsnapError::scan(format!(
            "cannot decode {} into {}",
            other.kind_name(),
            target
        ))),
    }
}

fn raw_to_u64(raw: RawValue, target: ScanType) -> Result<u64> {
    match raw {
        RawValue::UInteger(u) => Ok(u),
        RawValue::Integer(i) => u64::try_from(i).map_err(|_| out_of_range(i, target)),
        RawValue::Text(s) => parse_number(&s, target),
        RawValue::Bytes(b) => parse_number(&String::from_utf8_lossy(&b), target),
        RawValue::Null => Err(null_in(target)),
        other => Err(RowsnapError::scan(format!(
            "cannot decode {} into {}",
            other.kind_name(),
            target
        ))),
    }
}

fn raw_to_f64(raw: RawValue, target: ScanType) -> Result<f64> {
    match raw {
        RawValue::Float(f) => Ok(f),
        RawValue::Integer(i) => Ok(i as f64),
        RawValue::UInteger(u) => Ok(u as f64),
        RawValue::Text(s) => parse_number(&s, target),
        RawValue::Bytes(b) => parse_number(&String::from_utf8_lossy(&b), target),
        RawValue::Null => Err(null_in(target)),
        other => Err(RowsnapError::scan(format!(
            "cannot decode {} into {}",
            other.kind_name(),
            target
        ))),
    }
}

fn raw_to_timestamp(raw: RawValue, target: ScanType) -> Result<DateTime<FixedOffset>> {
    match raw {
        RawValue::Timestamp(t) => Ok(t),
        RawValue::Text(s) => parse_timestamp(&s)
            .ok_or_else(|| RowsnapError::scan(format!("unrecognised timestamp text {:?}", s))),
        RawValue::Bytes(b) => {
            let s = String::from_utf8_lossy(&b);
            parse_timestamp(&s)
                .ok_or_else(|| RowsnapError::scan(format!("unrecognised timestamp text {:?}", s)))
        }
        RawValue::Integer(secs) => DateTime::from_timestamp(secs, 0)
            .map(|t| t.fixed_offset())
            .ok_or_else(|| out_of_range(secs, target)),
        RawValue::Null => Err(null_in(target)),
        other => Err(RowsnapError::scan(format!(
            "cannot decode {} into {}",
            other.kind_name(),
            target
        ))),
    }
}

fn narrow<S, T>(v: S, target: ScanType) -> Result<T>
where
    S: Copy + fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(v).map_err(|_| out_of_range(v, target))
}

fn narrow_json<S, T>(v: S, target: ScanType) -> Result<T>
where
    S: Copy + fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(v)
        .map_err(|_| RowsnapError::serialization(format!("{} is out of range for {}", v, target)))
}

fn parse_number<T: std::str::FromStr>(s: &str, target: ScanType) -> Result<T> {
    s.trim()
        .parse::<T>()
        .map_err(|_| RowsnapError::scan(format!("cannot parse {:?} as {}", s, target)))
}

fn null_in(target: ScanType) -> RowsnapError {
    RowsnapError::scan(format!("NULL in non-nullable {} column", target))
}

fn out_of_range(v: impl fmt::Display, target: ScanType) -> RowsnapError {
    RowsnapError::scan(format!("{} is out of range for {}", v, target))
}

fn f64_to_json(v: f64) -> Json {
    match serde_json::Number::from_f64(v) {
        Some(n) => Json::Number(n),
        None if v.is_nan() => Json::String(NAN.to_string()),
        None if v > 0.0 => Json::String(POS_INF.to_string()),
        None => Json::String(NEG_INF.to_string()),
    }
}

fn json_to_f64(json: &Json) -> Option<f64> {
    match json {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => match s.as_str() {
            NAN => Some(f64::NAN),
            POS_INF => Some(f64::INFINITY),
            NEG_INF => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn json_to_timestamp(json: &Json) -> Option<DateTime<FixedOffset>> {
    json.as_str().and_then(parse_canonical_timestamp)
}
