//! Validation rule tiers
//!
//! Every tier inspects the dataset independently and reports errors,
//! warnings and the statistics it computed along the way.

use super::types::ValidatorConfig;
use crate::dataset::{Dataset, Value, ValueKind};
use crate::source::POST_FIELDS;
use crate::transform::DERIVED_COLUMNS;
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};

/// Columns a dataset must have
pub const REQUIRED_COLUMNS: [&str; 3] = ["id", "title", "subreddit"];

/// Text columns that must never be blank
pub const CRITICAL_TEXT_COLUMNS: [&str; 2] = ["id", "title"];

/// Share of negative scores above which the data looks suspicious
const NEGATIVE_SCORE_RATIO: f64 = 0.1;

/// Findings of one tier
#[derive(Debug, Default)]
pub(crate) struct TierReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: BTreeMap<String, JsonValue>,
}

impl TierReport {
    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn stat(&mut self, name: &str, value: JsonValue) {
        self.stats.insert(name.to_string(), value);
    }
}

// ============================================================================
// Structure
// ============================================================================

pub(crate) fn check_structure(dataset: &Dataset) -> TierReport {
    let mut report = TierReport::default();

    if dataset.is_empty() {
        report.error("Dataset is empty");
        return report;
    }

    report.stat("total_rows", json!(dataset.num_rows()));
    report.stat("total_columns", json!(dataset.num_columns()));

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|c| !dataset.has_column(c))
        .collect();
    if !missing.is_empty() {
        report.error(format!("Missing required columns: {missing:?}"));
    }

    let unexpected: Vec<&str> = dataset
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| !POST_FIELDS.contains(c) && !DERIVED_COLUMNS.contains(c))
        .collect();
    if !unexpected.is_empty() {
        report.warning(format!("Unexpected columns found: {unexpected:?}"));
    }

    if holds_other_than(dataset, "id", |k| k == ValueKind::Text) {
        report.warning("Column 'id' should be string type");
    }
    for column in ["score", "num_comments"] {
        if holds_other_than(dataset, column, ValueKind::is_numeric) {
            report.error(format!("Column '{column}' should be numeric"));
        }
    }
    if holds_other_than(dataset, "upvote_ratio", ValueKind::is_numeric) {
        report.warning("Column 'upvote_ratio' should be numeric");
    }

    report
}

/// True when a present column has a non-null cell failing `accept`
fn holds_other_than(dataset: &Dataset, column: &str, accept: impl Fn(ValueKind) -> bool) -> bool {
    dataset
        .column_kinds(column)
        .into_iter()
        .any(|kind| !accept(kind))
}

// ============================================================================
// Quality
// ============================================================================

pub(crate) fn check_quality(dataset: &Dataset, config: &ValidatorConfig) -> TierReport {
    let mut report = TierReport::default();
    let rows = dataset.num_rows();

    if rows < config.min_rows {
        report.error(format!(
            "Dataset has {rows} rows, minimum required is {}",
            config.min_rows
        ));
    }

    if let Some(ids) = dataset.column("id") {
        let mut seen = HashSet::new();
        let duplicates = ids
            .filter(|v| !seen.insert((v.kind(), v.to_string())))
            .count();
        report.stat("duplicate_ids", json!(duplicates));
        if duplicates > 0 {
            let message = format!("Found {duplicates} duplicate IDs");
            if config.require_unique_ids {
                report.error(message);
            } else {
                report.warning(message);
            }
        }
    }

    if rows > 0 {
        let ceiling = config.max_null_percentage;
        let mut percentages = JsonObject::new();
        for column in dataset.columns() {
            let pct = dataset.null_count(column) as f64 / rows as f64 * 100.0;
            percentages.insert(column.clone(), json!(pct));

            if pct > ceiling {
                report.error(format!(
                    "Column '{column}' has {pct:.2}% null values (max allowed: {ceiling}%)"
                ));
            } else if pct > ceiling / 2.0 {
                report.warning(format!("Column '{column}' has {pct:.2}% null values"));
            }
        }
        report.stat("null_percentages", JsonValue::Object(percentages));
    }

    for column in CRITICAL_TEXT_COLUMNS {
        let blank = dataset.column(column).map_or(0, |values| {
            values
                .filter(|v| v.as_str().is_some_and(|s| s.trim().is_empty()))
                .count()
        });
        if blank > 0 {
            let what = if column == "title" { "titles" } else { "ids" };
            report.error(format!("Found {blank} posts with empty {what}"));
        }
    }

    report
}

// ============================================================================
// Business Rules
// ============================================================================

pub(crate) fn check_business_rules(dataset: &Dataset, now: DateTime<Utc>) -> TierReport {
    let mut report = TierReport::default();
    let rows = dataset.num_rows();

    if let Some(scores) = dataset.column("score") {
        let negative = scores.filter(|v| v.as_f64().is_some_and(|s| s < 0.0)).count();
        report.stat("negative_scores", json!(negative));
        if negative as f64 > rows as f64 * NEGATIVE_SCORE_RATIO {
            report.warning(format!("High percentage of negative scores: {negative}"));
        }
    }

    let negative_comments = count_where(dataset, "num_comments", |n| n < 0.0);
    if negative_comments > 0 {
        report.error(format!(
            "Found {negative_comments} posts with negative comment counts"
        ));
    }

    let bad_ratios = count_where(dataset, "upvote_ratio", |r| !(0.0..=1.0).contains(&r));
    if bad_ratios > 0 {
        report.error(format!("Found {bad_ratios} posts with invalid upvote ratios"));
    }

    let created: Vec<DateTime<Utc>> = dataset
        .column("created_utc")
        .map(|values| values.filter_map(as_instant).collect())
        .unwrap_or_default();
    if !created.is_empty() {
        let future = created.iter().filter(|ts| **ts > now).count();
        if future > 0 {
            report.error(format!("Found {future} posts with future dates"));
        }
        if let (Some(min), Some(max)) = (created.iter().min(), created.iter().max()) {
            report.stat(
                "date_range",
                json!({
                    "min": Value::Timestamp(*min).to_string(),
                    "max": Value::Timestamp(*max).to_string(),
                }),
            );
        }
    }

    if let Some(values) = dataset.column("subreddit") {
        let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
        for name in values.filter(|v| !v.is_null()) {
            *distribution.entry(name.to_string()).or_default() += 1;
        }
        match distribution.len() {
            0 => report.error("No subreddits found in data"),
            1 => report.warning("Data contains posts from only one subreddit"),
            _ => {}
        }
        report.stat("subreddit_distribution", json!(distribution));
    }

    report
}

fn count_where(dataset: &Dataset, column: &str, predicate: impl Fn(f64) -> bool) -> usize {
    dataset.column(column).map_or(0, |values| {
        values
            .filter(|v| v.as_f64().is_some_and(&predicate))
            .count()
    })
}

/// Timestamps, or epoch seconds when the column was not coerced
fn as_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Int(secs) => DateTime::<Utc>::from_timestamp(*secs, 0),
        _ => None,
    }
}
