//! Dataset transformation
//!
//! [`Transformer`] runs four deterministic stages in order:
//! type coercion, cleaning, feature engineering and deduplication.

mod export;
mod stages;

pub use export::prepare_for_export;
pub use stages::{
    clean, coerce_types, deduplicate, engagement_score, engineer_features, popularity_category,
    truthy, BOOLEAN_COLUMNS, DERIVED_COLUMNS, FLOAT_COLUMNS, INTEGER_COLUMNS, NULL_PLACEHOLDERS,
    REMOVED_AUTHORS, STRING_COLUMNS,
};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use tracing::{info, warn};

type Stage = fn(Dataset) -> Result<Dataset>;

/// Stages in execution order
const STAGES: [(&str, Stage); 4] = [
    ("coerce_types", coerce_types),
    ("clean", clean),
    ("engineer_features", engineer_features),
    ("deduplicate", deduplicate),
];

/// Turns raw extracted rows into canonical records
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer;

impl Transformer {
    pub fn new() -> Self {
        Self
    }

    /// Run every stage. An empty dataset is returned unchanged.
    pub fn transform(&self, dataset: Dataset) -> Result<Dataset> {
        if dataset.is_empty() {
            warn!("Empty dataset provided for transformation");
            return Ok(dataset);
        }

        info!(rows = dataset.num_rows(), "Transforming posts");
        let mut dataset = dataset;
        for (name, stage) in STAGES {
            dataset = stage(dataset).map_err(|e| match e {
                e @ Error::Transformation { .. } => e,
                other => Error::transformation(name, other.to_string()),
            })?;
        }

        info!(rows = dataset.num_rows(), "Transformation complete");
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests;
