//! Codec Round-Trip Tests
//!
//! Verifies that `unmarshal(marshal(r))` reproduces `r` value for value and
//! order for order, for every canonical scan type.
//!
//! ## Scenarios Covered
//!
//! 1. Arbitrary result sets over all scan types (property)
//! 2. Explicit NULLs in every nullable column
//! 3. Non-finite floats
//! 4. Timestamp offsets, sub-second precision and signed extended years
//! 5. Re-encoding a decoded document is byte-identical

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, FixedOffset};
use proptest::prelude::*;
use rowsnap_core::codec::{marshal, unmarshal};
use rowsnap_core::{ColType, ResultSet, ResultType, ScanType, Value};

// Mostly four-digit years, plus signed years far outside 0000..=9999
fn timestamp() -> impl Strategy<Value = DateTime<FixedOffset>> {
    let secs = prop_oneof![
        3 => 86_400i64..253_402_000_000,
        1 => -6_000_000_000_000i64..6_000_000_000_000,
    ];
    (secs, 0u32..1_000_000_000, -1439i32..=1439).prop_map(
        |(secs, nanos, minutes)| {
            DateTime::from_timestamp(secs, nanos)
                .unwrap()
                .with_timezone(&FixedOffset::east_opt(minutes * 60).unwrap())
        },
    )
}

fn value_for(st: ScanType) -> BoxedStrategy<Value> {
    use proptest::option::of;
    match st {
        ScanType::Text => any::<String>().prop_map(Value::Text).boxed(),
        ScanType::NullableText => of(any::<String>()).prop_map(Value::NullableText).boxed(),
        ScanType::Int8 => any::<i8>().prop_map(Value::Int8).boxed(),
        ScanType::Int16 => any::<i16>().prop_map(Value::Int16).boxed(),
        ScanType::Int32 => any::<i32>().prop_map(Value::Int32).boxed(),
        ScanType::Int64 => any::<i64>().prop_map(Value::Int64).boxed(),
        ScanType::UInt8 => any::<u8>().prop_map(Value::UInt8).boxed(),
        ScanType::UInt16 => any::<u16>().prop_map(Value::UInt16).boxed(),
        ScanType::UInt32 => any::<u32>().prop_map(Value::UInt32).boxed(),
        ScanType::UInt64 => any::<u64>().prop_map(Value::UInt64).boxed(),
        ScanType::NullableInt64 => of(any::<i64>()).prop_map(Value::NullableInt64).boxed(),
        ScanType::Float32 => any::<f32>()
            .prop_filter("NaN never equals itself", |f| !f.is_nan())
            .prop_map(Value::Float32)
            .boxed(),
        ScanType::Float64 => any::<f64>()
            .prop_filter("NaN never equals itself", |f| !f.is_nan())
            .prop_map(Value::Float64)
            .boxed(),
        ScanType::NullableFloat64 => of(any::<f64>().prop_filter("NaN", |f| !f.is_nan()))
            .prop_map(Value::NullableFloat64)
            .boxed(),
        ScanType::Timestamp => timestamp().prop_map(Value::Timestamp).boxed(),
        ScanType::NullableTimestamp => of(timestamp()).prop_map(Value::NullableTimestamp).boxed(),
        ScanType::RawBytes => of(proptest::collection::vec(any::<u8>(), 0..32))
            .prop_map(Value::RawBytes)
            .boxed(),
    }
}

fn result_set() -> impl Strategy<Value = ResultSet> {
    let scan_types =
        proptest::collection::vec(proptest::sample::select(ScanType::ALL.to_vec()), 1..6);
    (scan_types, any::<bool>()).prop_flat_map(|(types, is_table)| {
        let row = types.iter().map(|st| value_for(*st)).collect::<Vec<_>>();
        proptest::collection::vec(row, 0..6).prop_map(move |rows| {
            let cols = types
                .iter()
                .enumerate()
                .map(|(i, st)| {
                    ColType::new(format!("c{}", i), "X", *st).with_nullable(st.is_nullable())
                })
                .collect();
            ResultSet::new(ResultType::new("generated", is_table, cols), rows).unwrap()
        })
    })
}

fn offsets(rs: &ResultSet) -> Vec<Option<i32>> {
    rs.data()
        .iter()
        .flatten()
        .map(|v| v.as_timestamp().map(|t| t.offset().local_minus_utc()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_round_trip_is_identity(rs in result_set()) {
        let decoded = unmarshal(&marshal(&rs).unwrap()).unwrap();
        prop_assert_eq!(decoded.result_type(), rs.result_type());
        prop_assert_eq!(decoded.data(), rs.data());
        prop_assert_eq!(offsets(&decoded), offsets(&rs));
    }
}

fn single_column(st: ScanType, values: Vec<Value>) -> ResultSet {
    let rt = ResultType::new("t", true, vec![ColType::new("v", "X", st)]);
    ResultSet::new(rt, values.into_iter().map(|v| vec![v]).collect()).unwrap()
}

#[test]
fn test_explicit_nulls_round_trip() {
    for st in ScanType::ALL.into_iter().filter(|t| t.is_nullable()) {
        let rs = single_column(st, vec![st.zero_value()]);
        assert!(rs.data()[0][0].is_null(), "{} zero value should be NULL", st);
        let decoded = unmarshal(&marshal(&rs).unwrap()).unwrap();
        assert_eq!(decoded.data(), rs.data(), "NULL lost for {}", st);
    }
}

#[test]
fn test_non_finite_floats_round_trip() {
    let rs = single_column(
        ScanType::Float64,
        vec![
            Value::Float64(f64::INFINITY),
            Value::Float64(f64::NEG_INFINITY),
            Value::Float64(f64::NAN),
        ],
    );
    let decoded = unmarshal(&marshal(&rs).unwrap()).unwrap();
    assert_eq!(decoded.data()[0][0], Value::Float64(f64::INFINITY));
    assert_eq!(decoded.data()[1][0], Value::Float64(f64::NEG_INFINITY));
    assert!(matches!(decoded.data()[2][0], Value::Float64(f) if f.is_nan()));
}

#[test]
fn test_year_ten_thousand_round_trips() {
    let t = DateTime::from_timestamp(253_402_300_800, 0).unwrap().fixed_offset();
    let rs = single_column(ScanType::Timestamp, vec![Value::Timestamp(t)]);
    let doc = marshal(&rs).unwrap();
    assert!(String::from_utf8_lossy(&doc).contains("+10000-01-01T00:00:00+00:00"));
    let decoded = unmarshal(&doc).unwrap();
    assert_eq!(decoded.data(), rs.data());
}

#[test]
fn test_raw_bytes_empty_and_null_stay_distinct() {
    let rs = single_column(
        ScanType::RawBytes,
        vec![
            Value::RawBytes(None),
            Value::RawBytes(Some(Vec::new())),
            Value::RawBytes(Some(vec![0, 255])),
        ],
    );
    let decoded = unmarshal(&marshal(&rs).unwrap()).unwrap();
    assert_eq!(decoded.data(), rs.data());
}

#[test]
fn test_reencoding_is_byte_identical() {
    let rt = ResultType::new(
        "orders",
        true,
        vec![
            ColType::new("id", "INTEGER", ScanType::Int64).with_nullable(false),
            ColType::new("amount", "DECIMAL", ScanType::Text)
                .with_full_database_type("DECIMAL(10,2)")
                .with_precision_scale(10, 2)
                .with_nullable(false),
            ColType::new("placed_at", "DATETIME", ScanType::NullableTimestamp).with_nullable(true),
        ],
    );
    let placed = DateTime::parse_from_rfc3339("2024-02-29T23:59:59.5-03:00").unwrap();
    let rs = ResultSet::new(
        rt,
        vec![
            vec![
                Value::Int64(1),
                Value::Text("19.90".to_string()),
                Value::NullableTimestamp(Some(placed)),
            ],
            vec![
                Value::Int64(2),
                Value::Text("0.00".to_string()),
                Value::NullableTimestamp(None),
            ],
        ],
    )
    .unwrap();

    let first = marshal(&rs).unwrap();
    let second = marshal(&unmarshal(&first).unwrap()).unwrap();
    assert_eq!(first, second);
    assert_eq!(unmarshal(&first).unwrap().col_types()[1].precision_scale(), Some((10, 2)));
}
