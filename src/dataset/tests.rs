//! Tests for the dataset module

use super::*;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;

fn sample() -> Dataset {
    Dataset::from_rows(
        ["id", "score"],
        vec![
            vec![Value::from("a"), Value::Int(1)],
            vec![Value::from("b"), Value::Null],
            vec![Value::from("c"), Value::Int(3)],
        ],
    )
    .unwrap()
}

// ============================================================================
// Value Tests
// ============================================================================

#[test]
fn test_value_from_json_scalars() {
    assert_eq!(Value::from_json(&json!(null)), Value::Null);
    assert_eq!(Value::from_json(&json!(true)), Value::Bool(true));
    assert_eq!(Value::from_json(&json!(42)), Value::Int(42));
    assert_eq!(Value::from_json(&json!(0.5)), Value::Float(0.5));
    assert_eq!(Value::from_json(&json!("hi")), Value::from("hi"));
    assert_eq!(
        Value::from_json(&json!({"a": 1})),
        Value::from("{\"a\":1}")
    );
}

#[test]
fn test_value_display() {
    let ts = Utc.with_ymd_and_hms(2021, 1, 1, 13, 5, 9).unwrap();
    assert_eq!(Value::Timestamp(ts).to_string(), "2021-01-01 13:05:09");
    assert_eq!(
        Value::Date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()).to_string(),
        "2021-01-01"
    );
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::Float(0.25).to_string(), "0.25");
}

#[test]
fn test_value_serializes_untagged() {
    let ts = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let json = serde_json::to_value(vec![
        Value::Null,
        Value::Int(3),
        Value::from("x"),
        Value::Timestamp(ts),
    ])
    .unwrap();
    assert_eq!(json, json!([null, 3, "x", "2021-01-01T00:00:00Z"]));
}

#[test]
fn test_value_numeric_views() {
    assert_eq!(Value::Int(2).as_f64(), Some(2.0));
    assert_eq!(Value::Float(2.5).as_i64(), None);
    assert_eq!(Value::from("2").as_f64(), None);
    assert!(ValueKind::Int.is_numeric());
    assert!(!ValueKind::Text.is_numeric());
}

#[test]
fn test_value_from_option() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

// ============================================================================
// Dataset Tests
// ============================================================================

#[test]
fn test_dataset_shape() {
    let ds = sample();
    assert_eq!(ds.num_rows(), 3);
    assert_eq!(ds.num_columns(), 2);
    assert!(!ds.is_empty());
    assert!(ds.has_column("score"));
    assert!(!ds.has_column("title"));
    assert_eq!(ds.get(2, "id"), Some(&Value::from("c")));
    assert_eq!(ds.get(5, "id"), None);
}

#[test]
fn test_dataset_rejects_ragged_rows() {
    let err = Dataset::from_rows(["a", "b"], vec![vec![Value::Null]]).unwrap_err();
    assert!(err.to_string().contains("expected 2"));
}

#[test]
fn test_dataset_rejects_duplicate_columns() {
    assert!(Dataset::from_rows(["a", "a"], vec![]).is_err());
}

#[test]
fn test_empty_dataset() {
    let ds = Dataset::empty();
    assert!(ds.is_empty());
    assert_eq!(ds.num_columns(), 0);
    assert_eq!(Dataset::new(["id"]).num_columns(), 1);
}

#[test]
fn test_null_count_and_kinds() {
    let ds = sample();
    assert_eq!(ds.null_count("score"), 1);
    assert_eq!(ds.null_count("missing"), 0);
    assert_eq!(ds.column_kinds("score"), vec![ValueKind::Int]);
    assert_eq!(ds.column_kinds("id"), vec![ValueKind::Text]);
}

#[test]
fn test_map_column() {
    let ds = sample().map_column("score", |v| match v {
        Value::Int(i) => Value::Int(i * 10),
        other => other,
    });
    let scores: Vec<_> = ds.column("score").unwrap().cloned().collect();
    assert_eq!(scores, vec![Value::Int(10), Value::Null, Value::Int(30)]);

    let untouched = sample().map_column("missing", |_| Value::Null);
    assert_eq!(untouched, sample());
}

#[test]
fn test_with_column_appends_and_replaces() {
    let ds = sample()
        .with_column("flag", vec![true.into(), false.into(), true.into()])
        .unwrap();
    assert_eq!(ds.columns(), ["id", "score", "flag"]);

    let ds = ds
        .with_column("score", vec![Value::Int(0), Value::Int(0), Value::Int(0)])
        .unwrap();
    assert_eq!(ds.num_columns(), 3);
    assert_eq!(ds.get(1, "score"), Some(&Value::Int(0)));

    assert!(ds.with_column("short", vec![Value::Null]).is_err());
}

#[test]
fn test_retain_rows_keeps_order() {
    let idx = sample().column_index("score").unwrap();
    let ds = sample().retain_rows(|row| !row[idx].is_null());
    let ids: Vec<_> = ds.column("id").unwrap().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn test_map_values_touches_every_cell() {
    let ds = sample().map_values(|v| Value::Text(v.to_string()));
    assert_eq!(ds.get(1, "score"), Some(&Value::from("")));
    assert_eq!(ds.get(2, "score"), Some(&Value::from("3")));
    assert_eq!(ds.num_rows(), 3);
}
