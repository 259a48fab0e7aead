//! Dataset validation
//!
//! [`Validator`] runs three rule tiers on every call (structure, quality
//! and business rules) and merges their findings into a
//! [`ValidationResult`]. Validation never mutates the dataset.

mod rules;
mod types;

pub use rules::{CRITICAL_TEXT_COLUMNS, REQUIRED_COLUMNS};
pub use types::{ColumnType, ValidationResult, ValidatorConfig};

use crate::dataset::Dataset;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::info;

/// Quality gate for transformed datasets
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidatorConfig,
    reference_time: Option<DateTime<Utc>>,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            reference_time: None,
        }
    }

    /// Judge "future" timestamps against a fixed instant instead of the clock
    #[must_use]
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every tier and aggregate the findings
    pub fn validate(&self, dataset: &Dataset) -> ValidationResult {
        let now = self.reference_time.unwrap_or_else(Utc::now);
        let tiers = [
            rules::check_structure(dataset),
            rules::check_quality(dataset, &self.config),
            rules::check_business_rules(dataset, now),
        ];

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut stats = BTreeMap::new();
        for tier in tiers {
            errors.extend(tier.errors);
            warnings.extend(tier.warnings);
            stats.extend(tier.stats);
        }

        let result = ValidationResult::new(errors, warnings, stats);
        info!(
            valid = result.is_valid(),
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "Validation complete"
        );
        result
    }

    /// Check that each expected column exists and holds the expected type
    ///
    /// A missing column is an error; a column holding other types is a
    /// warning. All-null columns conform to any type.
    pub fn validate_schema(
        &self,
        dataset: &Dataset,
        expected: &[(&str, ColumnType)],
    ) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (column, expected_type) in expected {
            if !dataset.has_column(column) {
                errors.push(format!("Missing column: {column}"));
                continue;
            }

            let kinds = dataset.column_kinds(column);
            if kinds.iter().any(|k| !expected_type.accepts(*k)) {
                let actual = kinds
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("|");
                warnings.push(format!(
                    "Column '{column}' has type {actual}, expected {expected_type}"
                ));
            }
        }

        ValidationResult::new(errors, warnings, BTreeMap::new())
    }
}
