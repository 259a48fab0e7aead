//! Tests for the transform module

use super::*;
use crate::dataset::Value;
use crate::types::ExportFormat;
use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// 2021-01-01 00:00:00 UTC, a Friday
const NEW_YEAR: i64 = 1_609_459_200;

fn raw(rows: Vec<Vec<Value>>) -> Dataset {
    Dataset::from_rows(
        [
            "id",
            "subreddit",
            "title",
            "selftext",
            "score",
            "num_comments",
            "author",
            "created_utc",
            "upvote_ratio",
            "is_self",
            "distinguished",
        ],
        rows,
    )
    .unwrap()
}

fn row(id: &str, title: &str, score: i64, comments: i64) -> Vec<Value> {
    vec![
        id.into(),
        "rust".into(),
        title.into(),
        Value::Null,
        score.into(),
        comments.into(),
        "ferris".into(),
        NEW_YEAR.into(),
        0.95.into(),
        true.into(),
        Value::Null,
    ]
}

fn column(dataset: &Dataset, name: &str) -> Vec<Value> {
    dataset.column(name).unwrap().cloned().collect()
}

// ============================================================================
// Type Coercion
// ============================================================================

#[test]
fn test_coerce_types_text_placeholders_become_null() {
    let mut r = row("a", "t", 1, 1);
    r[6] = "nan".into();
    r[3] = "nan".into();
    let mut r2 = row("b", "t", 1, 1);
    r2[6] = "".into();
    r2[0] = Value::Int(42);

    let ds = coerce_types(raw(vec![r, r2])).unwrap();
    assert_eq!(column(&ds, "author"), vec![Value::Null, Value::Null]);
    assert_eq!(ds.get(0, "selftext"), Some(&Value::Null));
    assert_eq!(ds.get(1, "id"), Some(&Value::from("42")));
}

#[test]
fn test_literal_none_and_null_text_is_kept() {
    let mut r = row("b", "None", 5, 1);
    r[6] = "null".into();
    let out = Transformer::new()
        .transform(raw(vec![row("a", "null", 5, 1), r]))
        .unwrap();

    assert_eq!(out.num_rows(), 2);
    assert_eq!(column(&out, "title"), vec![Value::from("null"), Value::from("None")]);
    assert_eq!(out.get(1, "author"), Some(&Value::from("null")));
}

#[test]
fn test_coerce_types_numeric() {
    let mut r = row("a", "t", 0, 0);
    r[4] = "17".into();
    r[5] = "lots".into();
    r[8] = Value::Int(1);
    let mut r2 = row("b", "t", 0, 0);
    r2[4] = Value::Float(3.0);
    r2[8] = " 0.5 ".into();

    let ds = coerce_types(raw(vec![r, r2])).unwrap();
    assert_eq!(column(&ds, "score"), vec![Value::Int(17), Value::Int(3)]);
    assert_eq!(column(&ds, "num_comments"), vec![Value::Null, Value::Int(0)]);
    assert_eq!(column(&ds, "upvote_ratio"), vec![Value::Float(1.0), Value::Float(0.5)]);
}

#[test_case(Value::Null, false; "null")]
#[test_case(Value::Bool(true), true; "bool")]
#[test_case(Value::from("moderator"), true; "distinguished text")]
#[test_case(Value::from("false"), false; "false text")]
#[test_case(Value::from(""), false; "empty text")]
#[test_case(Value::Int(0), false; "zero")]
#[test_case(Value::Float(2.5), true; "float")]
fn test_truthiness(value: Value, expected: bool) {
    assert_eq!(truthy(&value), expected);
}

#[test]
fn test_coerce_types_booleans() {
    let mut r = row("a", "t", 0, 0);
    r[10] = "moderator".into();
    r[9] = Value::Null;

    let ds = coerce_types(raw(vec![r])).unwrap();
    assert_eq!(ds.get(0, "distinguished"), Some(&Value::Bool(true)));
    assert_eq!(ds.get(0, "is_self"), Some(&Value::Bool(false)));
}

#[test]
fn test_coerce_types_derives_date_columns() {
    let mut r2 = row("b", "t", 0, 0);
    r2[7] = "not a time".into();

    let ds = coerce_types(raw(vec![row("a", "t", 0, 0), r2])).unwrap();
    assert_eq!(
        ds.get(0, "created_utc"),
        Some(&Value::Timestamp(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()))
    );
    assert_eq!(
        ds.get(0, "created_date"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()))
    );
    assert_eq!(ds.get(0, "created_hour"), Some(&Value::Int(0)));
    assert_eq!(ds.get(0, "created_day_of_week"), Some(&Value::from("Friday")));

    assert_eq!(ds.get(1, "created_utc"), Some(&Value::Null));
    assert_eq!(ds.get(1, "created_day_of_week"), Some(&Value::Null));
}

#[test]
fn test_coerce_types_skips_absent_columns() {
    let ds = Dataset::from_rows(["id"], vec![vec![Value::Int(1)]]).unwrap();
    let ds = coerce_types(ds).unwrap();
    assert_eq!(ds.columns(), ["id"]);
    assert_eq!(ds.get(0, "id"), Some(&Value::from("1")));
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_clean_trims_and_drops_blank_titles() {
    let mut r2 = row("b", "   ", 0, 0);
    r2[3] = "  body  ".into();
    let mut r3 = row("c", "x", 0, 0);
    r3[0] = Value::Null;

    let ds = clean(raw(vec![row("a", "  Hello  ", 0, 0), r2, r3])).unwrap();
    assert_eq!(ds.num_rows(), 1);
    assert_eq!(ds.get(0, "title"), Some(&Value::from("Hello")));
    assert!(ds.column("id").unwrap().all(|v| !v.is_null()));
    assert!(ds.column("title").unwrap().all(|v| !v.is_null()));
}

#[test]
fn test_clean_blanks_removed_authors() {
    let mut r1 = row("a", "t", 0, 0);
    r1[6] = "[deleted]".into();
    let mut r2 = row("b", "t", 0, 0);
    r2[6] = "[removed]".into();

    let ds = clean(raw(vec![r1, r2, row("c", "t", 0, 0)])).unwrap();
    assert_eq!(
        column(&ds, "author"),
        vec![Value::Null, Value::Null, Value::from("ferris")]
    );
}

#[test]
fn test_clean_blank_selftext_becomes_null() {
    let mut r = row("a", "t", 0, 0);
    r[3] = " \n ".into();
    let ds = clean(raw(vec![r])).unwrap();
    assert_eq!(ds.get(0, "selftext"), Some(&Value::Null));
    assert_eq!(ds.num_rows(), 1);
}

// ============================================================================
// Feature Engineering
// ============================================================================

#[test]
fn test_engineer_features_text_counts() {
    let mut r = row("a", "Hello big world", 0, 0);
    r[3] = "héllo".into();
    let ds = engineer_features(raw(vec![r])).unwrap();

    assert_eq!(ds.get(0, "title_length"), Some(&Value::Int(15)));
    assert_eq!(ds.get(0, "title_word_count"), Some(&Value::Int(3)));
    assert_eq!(ds.get(0, "selftext_length"), Some(&Value::Int(5)));
    assert_eq!(ds.get(0, "selftext_word_count"), Some(&Value::Int(1)));
}

#[test]
fn test_engineer_features_null_text_gives_null_counts() {
    let ds = engineer_features(raw(vec![row("a", "t", 0, 0)])).unwrap();
    assert_eq!(ds.get(0, "selftext_length"), Some(&Value::Null));
    assert_eq!(ds.get(0, "selftext_word_count"), Some(&Value::Null));
}

#[test]
fn test_engagement_score() {
    let ds = engineer_features(raw(vec![row("a", "t", 10, 4), row("b", "t", -3, 1)])).unwrap();
    assert_eq!(column(&ds, "engagement_score"), vec![Value::Int(18), Value::Int(-1)]);

    assert_eq!(engagement_score(&Value::Null, &Value::Int(1)), Value::Null);
    assert_eq!(
        engagement_score(&Value::Float(1.5), &Value::Int(1)),
        Value::Float(3.5)
    );
}

#[test]
fn test_engagement_score_overflow_falls_back_to_float() {
    let comments = i64::MAX / 2 + 1;
    assert_eq!(
        engagement_score(&Value::Int(-10), &Value::Int(comments)),
        Value::Float(-10.0 + 2.0 * comments as f64)
    );
    assert_eq!(
        engagement_score(&Value::Int(i64::MAX - 1), &Value::Int(1)),
        Value::Float((i64::MAX - 1) as f64 + 2.0)
    );
    assert_eq!(
        engagement_score(&Value::Int(-10), &Value::Int(i64::MAX / 2)),
        Value::Int(i64::MAX / 2 * 2 - 10)
    );
}

#[test_case(-5.0, "Negative")]
#[test_case(0.0, "Negative")]
#[test_case(1.0, "Low")]
#[test_case(10.0, "Low")]
#[test_case(11.0, "Medium")]
#[test_case(100.0, "Medium")]
#[test_case(101.0, "High")]
#[test_case(1000.0, "High")]
#[test_case(1001.0, "Viral")]
fn test_popularity_category_bins(score: f64, expected: &str) {
    assert_eq!(popularity_category(score), expected);
}

#[test]
fn test_popularity_column_null_for_missing_score() {
    let mut r = row("a", "t", 0, 0);
    r[4] = Value::Null;
    let ds = engineer_features(raw(vec![r, row("b", "t", 5000, 0)])).unwrap();
    assert_eq!(
        column(&ds, "popularity_category"),
        vec![Value::Null, Value::from("Viral")]
    );
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn test_deduplicate_keeps_first() {
    let ds = raw(vec![
        row("x", "first", 1, 0),
        row("y", "other", 1, 0),
        row("x", "second", 1, 0),
    ]);
    let ds = deduplicate(ds).unwrap();
    assert_eq!(ds.num_rows(), 2);
    assert_eq!(ds.get(0, "title"), Some(&Value::from("first")));
    assert_eq!(ds.get(1, "id"), Some(&Value::from("y")));
}

#[test]
fn test_deduplicate_is_idempotent() {
    let ds = raw(vec![row("x", "a", 1, 0), row("x", "b", 1, 0), row("z", "c", 1, 0)]);
    let once = deduplicate(ds).unwrap();
    let twice = deduplicate(once.clone()).unwrap();
    assert_eq!(once, twice);
}

// ============================================================================
// Transformer
// ============================================================================

#[test]
fn test_transform_full_pipeline() {
    let mut deleted = row("b", "  Second  ", 500, 20);
    deleted[6] = "[deleted]".into();
    let ds = raw(vec![
        row("a", "First post", 5, 1),
        deleted,
        row("a", "Duplicate", 5, 1),
        row("c", "", 0, 0),
    ]);

    let out = Transformer::new().transform(ds).unwrap();
    assert_eq!(out.num_rows(), 2);
    assert_eq!(
        column(&out, "title"),
        vec![Value::from("First post"), Value::from("Second")]
    );
    assert_eq!(out.get(1, "author"), Some(&Value::Null));
    assert_eq!(out.get(1, "popularity_category"), Some(&Value::from("High")));
    assert_eq!(out.get(1, "engagement_score"), Some(&Value::Int(540)));
    for derived in DERIVED_COLUMNS {
        assert!(out.has_column(derived), "missing {derived}");
    }
}

#[test]
fn test_transform_empty_input_unchanged() {
    let out = Transformer::new().transform(Dataset::empty()).unwrap();
    assert_eq!(out, Dataset::empty());

    let headers_only = Dataset::new(["id", "title"]);
    assert_eq!(Transformer::new().transform(headers_only.clone()).unwrap(), headers_only);
}

// ============================================================================
// Export Preparation
// ============================================================================

#[test]
fn test_prepare_for_csv() {
    let ds = coerce_types(raw(vec![row("a", "t", 3, 1)])).unwrap();
    let out = prepare_for_export(ds.clone(), ExportFormat::Csv);

    assert_eq!(out.num_rows(), ds.num_rows());
    assert_eq!(out.get(0, "created_utc"), Some(&Value::from("2021-01-01 00:00:00")));
    assert_eq!(out.get(0, "created_date"), Some(&Value::from("2021-01-01")));
    assert_eq!(out.get(0, "selftext"), Some(&Value::from("")));
    assert_eq!(out.get(0, "score"), Some(&Value::from("3")));
    assert!(out.rows().iter().flatten().all(|v| v.as_str().is_some()));
}

#[test]
fn test_prepare_for_json_keeps_nulls() {
    let ds = coerce_types(raw(vec![row("a", "t", 3, 1)])).unwrap();
    let out = prepare_for_export(ds, ExportFormat::Json);

    assert_eq!(out.get(0, "created_utc"), Some(&Value::from("2021-01-01T00:00:00Z")));
    assert_eq!(out.get(0, "selftext"), Some(&Value::Null));
    assert_eq!(out.get(0, "score"), Some(&Value::Int(3)));
}

#[test]
fn test_prepare_for_parquet_is_identity() {
    let ds = coerce_types(raw(vec![row("a", "t", 3, 1)])).unwrap();
    assert_eq!(prepare_for_export(ds.clone(), ExportFormat::Parquet), ds);
}
