//! Transformation stages
//!
//! Each stage takes a dataset by value and returns the next one. Columns a
//! stage works on are skipped when absent.

use crate::dataset::{Dataset, Value, ValueKind};
use crate::error::Result;
use chrono::{DateTime, Timelike, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Columns holding free text or identifiers
pub const STRING_COLUMNS: [&str; 7] = [
    "id",
    "subreddit",
    "title",
    "selftext",
    "author",
    "url",
    "permalink",
];

/// Integer counters
pub const INTEGER_COLUMNS: [&str; 2] = ["score", "num_comments"];

/// Fractional measures
pub const FLOAT_COLUMNS: [&str; 1] = ["upvote_ratio"];

/// Flags, coerced by truthiness
pub const BOOLEAN_COLUMNS: [&str; 4] = ["is_self", "over_18", "stickied", "distinguished"];

/// Text stand-ins for a missing value. Words like "None" are real titles
/// and author names, so only the float artifact counts.
pub const NULL_PLACEHOLDERS: [&str; 1] = ["nan"];

/// Authors Reddit shows for accounts that no longer exist
pub const REMOVED_AUTHORS: [&str; 2] = ["[deleted]", "[removed]"];

/// Columns added by [`coerce_types`] and [`engineer_features`]
pub const DERIVED_COLUMNS: [&str; 9] = [
    "created_date",
    "created_hour",
    "created_day_of_week",
    "title_length",
    "title_word_count",
    "selftext_length",
    "selftext_word_count",
    "engagement_score",
    "popularity_category",
];

// ============================================================================
// Type Coercion
// ============================================================================

/// Give every known column its canonical type and derive the date parts
/// of `created_utc`
pub fn coerce_types(mut dataset: Dataset) -> Result<Dataset> {
    for column in STRING_COLUMNS {
        dataset = dataset.map_column(column, to_text);
    }
    for column in INTEGER_COLUMNS {
        dataset = dataset.map_column(column, to_integer);
    }
    for column in FLOAT_COLUMNS {
        dataset = dataset.map_column(column, to_float);
    }
    for column in BOOLEAN_COLUMNS {
        dataset = dataset.map_column(column, |v| Value::Bool(truthy(&v)));
    }

    if !dataset.has_column("created_utc") {
        return Ok(dataset);
    }

    let dataset = dataset.map_column("created_utc", to_timestamp);
    let timestamps: Vec<Option<DateTime<Utc>>> = dataset
        .column("created_utc")
        .map(|values| values.map(Value::as_timestamp).collect())
        .unwrap_or_default();

    let derive = |f: fn(DateTime<Utc>) -> Value| -> Vec<Value> {
        timestamps
            .iter()
            .map(|ts| ts.map_or(Value::Null, f))
            .collect()
    };

    dataset
        .with_column("created_date", derive(|ts| Value::Date(ts.date_naive())))?
        .with_column("created_hour", derive(|ts| Value::Int(i64::from(ts.hour()))))?
        .with_column(
            "created_day_of_week",
            derive(|ts| Value::Text(ts.format("%A").to_string())),
        )
}

fn to_text(value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Text(s) if s.is_empty() || NULL_PLACEHOLDERS.contains(&s.as_str()) => Value::Null,
        Value::Text(s) => Value::Text(s),
        other => Value::Text(other.to_string()),
    }
}

fn to_integer(value: Value) -> Value {
    match to_float(value) {
        Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Int(f as i64),
        other => other,
    }
}

fn to_float(value: Value) -> Value {
    match value {
        Value::Int(i) => Value::Float(i as f64),
        Value::Float(f) if f.is_finite() => Value::Float(f),
        Value::Bool(b) => Value::Float(if b { 1.0 } else { 0.0 }),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map_or(Value::Null, Value::Float),
        _ => Value::Null,
    }
}

/// Truthiness of a cell; null is false
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::Text(s) => {
            let s = s.trim();
            !(s.is_empty() || s.eq_ignore_ascii_case("false") || s == "0")
        }
        Value::Timestamp(_) | Value::Date(_) => true,
    }
}

fn to_timestamp(value: Value) -> Value {
    let seconds = match value {
        Value::Timestamp(_) => return value,
        Value::Int(i) => Some(i),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    };
    seconds
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map_or(Value::Null, Value::Timestamp)
}

// ============================================================================
// Cleaning
// ============================================================================

/// Trim text, drop rows missing `id` or `title`, and blank out removed
/// authors
pub fn clean(mut dataset: Dataset) -> Result<Dataset> {
    for column in ["title", "selftext"] {
        dataset = dataset.map_column(column, |v| match v {
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Value::Null
                } else if trimmed.len() == s.len() {
                    Value::Text(s)
                } else {
                    Value::text(trimmed)
                }
            }
            other => other,
        });
    }

    for column in ["id", "title"] {
        let Some(idx) = dataset.column_index(column) else {
            continue;
        };
        let before = dataset.num_rows();
        dataset = dataset.retain_rows(|row| !row[idx].is_null());
        let removed = before - dataset.num_rows();
        if removed > 0 {
            debug!(column, removed, "Removed rows with missing value");
        }
    }

    Ok(dataset.map_column("author", |v| match v {
        Value::Text(s) if REMOVED_AUTHORS.contains(&s.as_str()) || s == "nan" => Value::Null,
        other => other,
    }))
}

// ============================================================================
// Feature Engineering
// ============================================================================

/// Add text length, engagement and popularity columns
pub fn engineer_features(mut dataset: Dataset) -> Result<Dataset> {
    for column in ["title", "selftext"] {
        let Some(values) = dataset.column(column) else {
            continue;
        };
        let (lengths, words): (Vec<Value>, Vec<Value>) = values
            .map(|v| match v.as_str() {
                Some(s) => (
                    Value::Int(s.chars().count() as i64),
                    Value::Int(s.split_whitespace().count() as i64),
                ),
                None => (Value::Null, Value::Null),
            })
            .unzip();
        dataset = dataset
            .with_column(&format!("{column}_length"), lengths)?
            .with_column(&format!("{column}_word_count"), words)?;
    }

    let engagement: Option<Vec<Value>> =
        match (dataset.column("score"), dataset.column("num_comments")) {
            (Some(scores), Some(comments)) => Some(
                scores
                    .zip(comments)
                    .map(|(score, comments)| engagement_score(score, comments))
                    .collect(),
            ),
            _ => None,
        };
    if let Some(engagement) = engagement {
        dataset = dataset.with_column("engagement_score", engagement)?;
    }

    let categories: Option<Vec<Value>> = dataset.column("score").map(|scores| {
        scores
            .map(|s| s.as_f64().map_or(Value::Null, |s| Value::text(popularity_category(s))))
            .collect()
    });
    if let Some(categories) = categories {
        dataset = dataset.with_column("popularity_category", categories)?;
    }

    Ok(dataset)
}

/// `score + 2 * num_comments`, null when either side is missing
pub fn engagement_score(score: &Value, comments: &Value) -> Value {
    match (score, comments) {
        (Value::Int(s), Value::Int(c)) => c
            .checked_mul(2)
            .and_then(|d| s.checked_add(d))
            .map_or(Value::Float(*s as f64 + 2.0 * *c as f64), Value::Int),
        _ => match (score.as_f64(), comments.as_f64()) {
            (Some(s), Some(c)) => Value::Float(s + 2.0 * c),
            _ => Value::Null,
        },
    }
}

/// Popularity bucket for a score; each bucket includes its upper bound
pub fn popularity_category(score: f64) -> &'static str {
    if score <= 0.0 {
        "Negative"
    } else if score <= 10.0 {
        "Low"
    } else if score <= 100.0 {
        "Medium"
    } else if score <= 1000.0 {
        "High"
    } else {
        "Viral"
    }
}

// ============================================================================
// Deduplication
// ============================================================================

/// Keep the first row for each `id`
pub fn deduplicate(dataset: Dataset) -> Result<Dataset> {
    let Some(idx) = dataset.column_index("id") else {
        return Ok(dataset);
    };

    let before = dataset.num_rows();
    let mut seen: HashSet<(ValueKind, String)> = HashSet::with_capacity(before);
    let dataset = dataset.retain_rows(|row| seen.insert((row[idx].kind(), row[idx].to_string())));

    let removed = before - dataset.num_rows();
    if removed > 0 {
        debug!(removed, "Removed duplicate posts");
    }
    Ok(dataset)
}
