//! Validation types

use crate::dataset::ValueKind;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Thresholds for the quality tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Fewest rows a dataset may have
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
    /// Highest null percentage a column may have before it is an error
    #[serde(default = "default_max_null_percentage")]
    pub max_null_percentage: f64,
    /// Whether duplicate ids are an error rather than a warning
    pub require_unique_ids: bool,
}

fn default_min_rows() -> usize {
    1
}

fn default_max_null_percentage() -> f64 {
    50.0
}

impl ValidatorConfig {
    /// Default thresholds with an explicit duplicate-id policy
    pub fn new(require_unique_ids: bool) -> Self {
        Self {
            min_rows: default_min_rows(),
            max_null_percentage: default_max_null_percentage(),
            require_unique_ids,
        }
    }

    #[must_use]
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    #[must_use]
    pub fn with_max_null_percentage(mut self, pct: f64) -> Self {
        self.max_null_percentage = pct;
        self
    }
}

/// Outcome of a validation run
///
/// `is_valid` is true exactly when there are no errors. Warnings never
/// affect validity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    stats: BTreeMap<String, JsonValue>,
}

impl ValidationResult {
    /// Build a result, dropping repeated messages while keeping order
    pub fn new(
        errors: Vec<String>,
        warnings: Vec<String>,
        stats: BTreeMap<String, JsonValue>,
    ) -> Self {
        let errors = dedup_preserving_order(errors);
        let warnings = dedup_preserving_order(warnings);
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            stats,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn stats(&self) -> &BTreeMap<String, JsonValue> {
        &self.stats
    }

    pub fn stat(&self, name: &str) -> Option<&JsonValue> {
        self.stats.get(name)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_valid { "VALID" } else { "INVALID" };
        writeln!(f, "Validation Status: {status}")?;
        if !self.errors.is_empty() {
            writeln!(f, "Errors ({}):", self.errors.len())?;
            for error in &self.errors {
                writeln!(f, "  - {error}")?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings ({}):", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }
        Ok(())
    }
}

fn dedup_preserving_order(messages: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(messages.len());
    for message in messages {
        if !out.contains(&message) {
            out.push(message);
        }
    }
    out
}

/// Expected column type for [`Validator::validate_schema`](super::Validator::validate_schema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    /// Integer or float
    Numeric,
    Boolean,
    Timestamp,
    Date,
}

impl ColumnType {
    /// Whether a non-null cell of `kind` conforms to this type
    pub fn accepts(self, kind: ValueKind) -> bool {
        match self {
            ColumnType::Text => kind == ValueKind::Text,
            ColumnType::Integer => kind == ValueKind::Int,
            ColumnType::Float => kind == ValueKind::Float,
            ColumnType::Numeric => kind.is_numeric(),
            ColumnType::Boolean => kind == ValueKind::Bool,
            ColumnType::Timestamp => kind == ValueKind::Timestamp,
            ColumnType::Date => kind == ValueKind::Date,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Numeric => "numeric",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Date => "date",
        };
        f.write_str(name)
    }
}
