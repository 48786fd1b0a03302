use crate::model::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of one cell comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Equal,
    Differs(String),
}

impl Verdict {
    pub fn is_equal(&self) -> bool {
        matches!(self, Verdict::Equal)
    }
}

type CustomFn = dyn Fn(&Value, &Value) -> Verdict + Send + Sync;

/// Per-column equality override
///
/// Built-ins are pure. `Custom` closures must be too, since comparators may
/// be shared across threads.
#[derive(Clone)]
pub enum Comparator {
    /// Direct value equality
    ExactEqual,
    /// Same instant, offsets ignored
    TimeEqual,
    /// Actual strictly later than expected
    TimeAfter,
    /// Byte-wise equality, NULL distinct from empty
    RawBytesEqual,
    Custom(Arc<CustomFn>),
}

/// Column name to comparator
pub type Comparators = BTreeMap<String, Comparator>;

impl Comparator {
    /// Wrap a closure as a comparator
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Verdict + Send + Sync + 'static,
    {
        Comparator::Custom(Arc::new(f))
    }

    /// Look up a built-in by name (`exact`, `time_equal`, `time_after`, `raw_bytes`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exact" => Some(Comparator::ExactEqual),
            "time_equal" => Some(Comparator::TimeEqual),
            "time_after" => Some(Comparator::TimeAfter),
            "raw_bytes" => Some(Comparator::RawBytesEqual),
            _ => None,
        }
    }

    /// Compare an expected cell with an actual cell
    pub fn compare(&self, expect: &Value, actual: &Value) -> Verdict {
        match self {
            Comparator::ExactEqual => {
                if direct_eq(expect, actual) {
                    Verdict::Equal
                } else {
                    differs(expect, actual)
                }
            }
            Comparator::TimeEqual => match (expect.as_timestamp(), actual.as_timestamp()) {
                (Some(e), Some(a)) if e == a => Verdict::Equal,
                (None, None) if expect.is_null() && actual.is_null() => Verdict::Equal,
                _ => differs(expect, actual),
            },
            Comparator::TimeAfter => {
                let Some(a) = actual.as_timestamp() else {
                    return Verdict::Differs(format!("expect timestamp, got {}", actual));
                };
                let Some(e) = expect.as_timestamp() else {
                    return Verdict::Differs(format!("expect timestamp, got {}", expect));
                };
                if a > e {
                    Verdict::Equal
                } else {
                    Verdict::Differs("actual time should after expect time".to_string())
                }
            }
            Comparator::RawBytesEqual => match (expect, actual) {
                (Value::RawBytes(e), Value::RawBytes(a)) if e == a => Verdict::Equal,
                _ => differs(expect, actual),
            },
            Comparator::Custom(f) => f(expect, actual),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::ExactEqual => f.write_str("ExactEqual"),
            Comparator::TimeEqual => f.write_str("TimeEqual"),
            Comparator::TimeAfter => f.write_str("TimeAfter"),
            Comparator::RawBytesEqual => f.write_str("RawBytesEqual"),
            Comparator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// NaN equals NaN so that a result always matches itself.
pub(crate) fn direct_eq(e: &Value, a: &Value) -> bool {
    match (e, a) {
        (Value::Float32(x), Value::Float32(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Float64(x), Value::Float64(y))
        | (Value::NullableFloat64(Some(x)), Value::NullableFloat64(Some(y))) => {
            x == y || (x.is_nan() && y.is_nan())
        }
        _ => e == a,
    }
}

fn differs(expect: &Value, actual: &Value) -> Verdict {
    Verdict::Differs(format!("expect: {}, actual: {}", expect, actual))
}
