//! Check Step Tests
//!
//! Tests for recording and checking query snapshots through
//! `Harness::check_queries`.
//!
//! ## Scenarios Covered
//!
//! - Record then check with unchanged data matches
//! - Changed data reports the result name and the differing row
//! - Extra or unrecorded queries are structural mismatches
//! - Timestamp columns need a comparator
//! - Time-after comparator accepts a later clock time
//! - Apply mode is not a check mode; empty names are rejected
//! - Test ids with '/' nest directories
//! - Failed checks are logged

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use common::{setup_config, setup_db};
use rowsnap_core::logging_facility::test_capture::init_test_capture;
use rowsnap_core::rowsnap_core_types::schema::FIELD_ERR_CODE;
use rowsnap_core::{Comparator, Database, ExErrorKind, Query, Statement, Value};
use rowsnap_engine::{CheckArgs, Harness, Mode, OffsetClock, Outcome};
use rowsnap_store::{Dialect, SqlBuilder};

fn user_queries() -> Vec<Query> {
    vec![
        Query::new("named_users", "SELECT id, name FROM users WHERE name IS NOT NULL ORDER BY id"),
        Query::new("user_count", "SELECT count(*) AS n FROM users"),
    ]
}

fn args(mode: Mode, queries: Vec<Query>) -> CheckArgs {
    CheckArgs {
        mode,
        name: "after_signup".to_string(),
        queries,
        overwrite: false,
    }
}

#[test]
fn test_record_then_check_matches() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "check_test", config);

    let outcome = harness.check_queries(args(Mode::Record, user_queries())).unwrap();
    assert!(matches!(outcome, Outcome::Recorded(_)));

    let outcome = harness.check_queries(args(Mode::Check, user_queries())).unwrap();
    assert_eq!(outcome, Outcome::Checked);
}

#[test]
fn test_changed_row_is_a_value_mismatch() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "changed_test", config);
    harness.check_queries(args(Mode::Record, user_queries())).unwrap();

    // When a recorded row changes
    db.exec(&Statement::new("UPDATE users SET name = 'bea' WHERE id = 2")).unwrap();

    // Then the diagnostic names the result and the expected row
    let err = harness.check_queries(args(Mode::Check, user_queries())).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ValueMismatch);
    assert_eq!(err.op(), Some("check_queries"));
    assert!(err.message().contains("check snapshot fail, result name: named_users"));
    assert!(err.message().contains("check result fail, row: "));
    assert!(err.message().contains("check row fail, col: name"));
}

#[test]
fn test_extra_row_is_a_length_mismatch() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "length_test", config);
    harness.check_queries(args(Mode::Record, user_queries())).unwrap();

    db.exec(&Statement::new("INSERT INTO users VALUES (4, 'dan')")).unwrap();

    let err = harness.check_queries(args(Mode::Check, user_queries())).unwrap_err();
    assert!(err.message().contains("check result fail: len(rows), expect 2, actual 3"));
}

#[test]
fn test_query_set_changes_are_structural() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "structure_test", config);
    harness.check_queries(args(Mode::Record, user_queries())).unwrap();

    // A query the recording never saw
    let mut queries = user_queries();
    queries.push(Query::new("event_count", "SELECT count(*) AS n FROM events"));
    let err = harness.check_queries(args(Mode::Check, queries)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::StructuralMismatch);
    assert!(err.message().contains("result name: event_count"));

    // A recorded result no query asks for
    let mut queries = user_queries();
    queries.pop();
    let err = harness.check_queries(args(Mode::Check, queries)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::StructuralMismatch);
    assert!(err.message().contains("len(results), expect 2, actual 1"));
}

#[test]
fn test_timestamp_column_needs_comparator() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "comparator_test", config);

    let queries = vec![Query::new("events", "SELECT id, created_at FROM events")];
    harness.check_queries(args(Mode::Record, queries.clone())).unwrap();

    let err = harness.check_queries(args(Mode::Check, queries)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::MissingComparator);
    assert_eq!(err.entity_id(), Some("created_at"));
}

#[test]
fn test_time_after_accepts_later_clock_time() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "time_after_test", config);
    let query = Query::new("events", "SELECT id, created_at FROM events")
        .with_comparator("created_at", Comparator::TimeAfter);

    // Given a recording made at 2020-01-01
    harness.check_queries(args(Mode::Record, vec![query.clone()])).unwrap();

    // When the code under test stamps the row with a later clock time
    let mut clock = OffsetClock::new();
    clock.reset_to(Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap());
    let stamped: DateTime<FixedOffset> = clock.now().into();
    db.exec(
        &Statement::new("UPDATE events SET created_at = ? WHERE id = 1")
            .with_args(vec![Value::NullableTimestamp(Some(stamped))]),
    )
    .unwrap();

    // Then the check passes
    let outcome = harness.check_queries(args(Mode::Check, vec![query.clone()])).unwrap();
    assert_eq!(outcome, Outcome::Checked);

    // And an earlier time fails
    db.exec(&Statement::new("UPDATE events SET created_at = '2019-01-01 00:00:00'")).unwrap();
    let err = harness.check_queries(args(Mode::Check, vec![query])).unwrap_err();
    assert!(err.message().contains("actual time should after expect time"));
}

#[test]
fn test_apply_mode_and_bad_names_rejected() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "reject_test", config);

    let err = harness.check_queries(args(Mode::Apply, user_queries())).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    let mut empty = args(Mode::Record, user_queries());
    empty.name = String::new();
    let err = harness.check_queries(empty).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidName);

    let bad_query = vec![Query::new("user count", "SELECT 1")];
    let err = harness.check_queries(args(Mode::Record, bad_query)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidName);
}

#[test]
fn test_nested_test_id() {
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, dir) = setup_config();
    let harness = Harness::new(&db, &builder, "suite/case_one", config);

    harness.check_queries(args(Mode::Record, user_queries())).unwrap();

    assert!(dir
        .path()
        .join("suite")
        .join("case_one")
        .join("after_signup")
        .join("named_users.json")
        .is_file());
    let loaded = harness.load_snapshot("after_signup").unwrap();
    assert_eq!(loaded.result_names(), vec!["named_users", "user_count"]);
}

#[test]
fn test_failed_check_is_logged() {
    let capture = init_test_capture();
    let db = setup_db();
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let (config, _dir) = setup_config();
    let harness = Harness::new(&db, &builder, "logged_check_test", config);

    harness.check_queries(args(Mode::Check, user_queries())).unwrap_err();

    capture.assert_event_exists("check_queries", "start");
    capture.assert_event_exists("check_queries", "end_error");
    let not_found = capture.count_events(|e| {
        e.op.as_deref() == Some("check_queries")
            && e.fields.get(FIELD_ERR_CODE).map(String::as_str) == Some("ERR_NOT_FOUND")
    });
    assert!(not_found >= 1);
}
