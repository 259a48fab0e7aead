//! Pipeline run types

use crate::batch::BatchStats;
use crate::types::{SortMode, TimeFilter};
use crate::validate::ValidationResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Run State
// ============================================================================

/// Stage a pipeline run is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Init,
    Extracting,
    Transforming,
    Validating,
    Persisting,
    Done,
    Failed,
}

impl RunState {
    /// `Done` and `Failed` end a run
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// The stage that follows this one on success
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::Init => Some(RunState::Extracting),
            RunState::Extracting => Some(RunState::Transforming),
            RunState::Transforming => Some(RunState::Validating),
            RunState::Validating => Some(RunState::Persisting),
            RunState::Persisting => Some(RunState::Done),
            RunState::Done | RunState::Failed => None,
        }
    }

    /// Whether a run may move from this state to `to`
    ///
    /// Stages advance one at a time; any non-terminal state may fail.
    pub fn can_transition_to(self, to: RunState) -> bool {
        if to == RunState::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Init => "INIT",
            RunState::Extracting => "EXTRACTING",
            RunState::Transforming => "TRANSFORMING",
            RunState::Validating => "VALIDATING",
            RunState::Persisting => "PERSISTING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Run Parameters
// ============================================================================

/// What one pipeline run extracts and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    /// Subreddits, extracted in order
    pub partitions: Vec<String>,
    pub sort: SortMode,
    pub time_filter: TimeFilter,
    /// Per-partition cap; `None` reads the listing to its end
    pub limit_per_partition: Option<usize>,
    /// Name handed to the sink; defaults to `reddit_YYYYMMDD`
    pub output_name: Option<String>,
    /// Run the validation gate
    pub validate: bool,
    /// Run the transformation stages
    pub transform: bool,
}

impl RunParams {
    /// Defaults for the given partitions, with both stages enabled
    pub fn new<S: Into<String>>(partitions: impl IntoIterator<Item = S>) -> Self {
        Self {
            partitions: partitions.into_iter().map(Into::into).collect(),
            sort: SortMode::default(),
            time_filter: TimeFilter::default(),
            limit_per_partition: None,
            output_name: None,
            validate: true,
            transform: true,
        }
    }

    #[must_use]
    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn time_filter(mut self, time_filter: TimeFilter) -> Self {
        self.time_filter = time_filter;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit_per_partition = Some(limit);
        self
    }

    #[must_use]
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    #[must_use]
    pub fn transform(mut self, enabled: bool) -> Self {
        self.transform = enabled;
        self
    }
}

/// Default output name for a run on `date`
pub fn default_output_name(date: NaiveDate) -> String {
    format!("reddit_{}", date.format("%Y%m%d"))
}

// ============================================================================
// Run Report
// ============================================================================

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Where the sink put the dataset
    pub location: String,
    pub rows_extracted: usize,
    pub rows_persisted: usize,
    /// `None` when validation was disabled
    pub validation: Option<ValidationResult>,
    pub batch_stats: BatchStats,
    /// Every state the run entered, in order
    pub states: Vec<RunState>,
}
