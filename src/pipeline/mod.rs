//! Pipeline orchestration
//!
//! Sequences extract, transform, validate and persist under a strict
//! state machine.
//!
//! # Overview
//!
//! - [`Pipeline`] - owns one component per stage and runs them in order
//! - [`RunState`] - `INIT → EXTRACTING → TRANSFORMING → VALIDATING →
//!   PERSISTING → DONE`, with `FAILED` reachable from any non-terminal state
//! - [`RunParams`] / [`RunReport`] - the inputs and outcome of one run
//!
//! A run either returns the persisted location or an [`Error::Pipeline`]
//! naming the stage that failed. The sink is only called after an
//! error-free validation.

mod types;

pub use types::{default_output_name, RunParams, RunReport, RunState};

use crate::batch::BatchExtractor;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::output::Sink;
use crate::transform::Transformer;
use crate::validate::Validator;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Tracks the state of a single run
#[derive(Debug)]
struct RunTracker {
    state: RunState,
    history: Vec<RunState>,
}

impl RunTracker {
    fn new() -> Self {
        Self {
            state: RunState::Init,
            history: vec![RunState::Init],
        }
    }

    fn advance(&mut self, to: RunState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(Error::IllegalTransition {
                from: self.state,
                to,
            });
        }
        debug!(from = %self.state, to = %to, "Pipeline state change");
        self.state = to;
        self.history.push(to);
        Ok(())
    }

    /// Move to `Failed` and wrap `cause` with the stage it came from
    fn fail(&mut self, cause: Error) -> Error {
        let stage = self.state;
        error!(stage = %stage, error = %cause, "Pipeline failed");
        if self.state.can_transition_to(RunState::Failed) {
            self.state = RunState::Failed;
            self.history.push(RunState::Failed);
        }
        Error::pipeline(stage, cause)
    }
}

/// Extract → transform → validate → persist
pub struct Pipeline {
    extractor: BatchExtractor,
    transformer: Transformer,
    validator: Validator,
    sink: Box<dyn Sink>,
    pacing_delay: Duration,
}

impl Pipeline {
    pub fn new(
        extractor: BatchExtractor,
        transformer: Transformer,
        validator: Validator,
        sink: impl Sink + 'static,
    ) -> Self {
        Self::with_boxed_sink(extractor, transformer, validator, Box::new(sink))
    }

    pub fn with_boxed_sink(
        extractor: BatchExtractor,
        transformer: Transformer,
        validator: Validator,
        sink: Box<dyn Sink>,
    ) -> Self {
        Self {
            extractor,
            transformer,
            validator,
            sink,
            pacing_delay: Duration::ZERO,
        }
    }

    /// Delay between consecutive partitions
    #[must_use]
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Run the pipeline and return the persisted location
    pub async fn run(&self, params: &RunParams) -> Result<String> {
        Ok(self.run_with_report(params).await?.location)
    }

    /// Run the pipeline and return a full report
    pub async fn run_with_report(&self, params: &RunParams) -> Result<RunReport> {
        let start = Instant::now();
        let mut run = RunTracker::new();

        if params.partitions.is_empty() {
            return Err(run.fail(Error::invalid_argument("No partitions to extract")));
        }

        info!(
            partitions = params.partitions.len(),
            sort = %params.sort,
            time_filter = %params.time_filter,
            limit = ?params.limit_per_partition,
            "Starting pipeline run"
        );

        // Extract
        run.advance(RunState::Extracting)?;
        let (dataset, batch_stats) = match self
            .extractor
            .extract_many_with_stats(
                &params.partitions,
                params.sort,
                params.time_filter,
                params.limit_per_partition,
                self.pacing_delay,
            )
            .await
        {
            Ok(extracted) => extracted,
            Err(e) => return Err(run.fail(e)),
        };
        if dataset.is_empty() {
            return Err(run.fail(Error::EmptyBatch));
        }
        let rows_extracted = dataset.num_rows();

        // Transform
        run.advance(RunState::Transforming)?;
        let dataset = if params.transform {
            match self.transformer.transform(dataset) {
                Ok(transformed) => transformed,
                Err(e) => return Err(run.fail(e)),
            }
        } else {
            info!("Transformation disabled, skipping");
            dataset
        };

        // Validate
        run.advance(RunState::Validating)?;
        let validation = if params.validate {
            let result = self.validator.validate(&dataset);
            for warning in result.warnings() {
                warn!(warning = %warning, "Validation warning");
            }
            if !result.is_valid() {
                return Err(run.fail(Error::ValidationFailed {
                    errors: result.errors().to_vec(),
                }));
            }
            Some(result)
        } else {
            info!("Validation disabled, skipping");
            None
        };

        // Persist
        run.advance(RunState::Persisting)?;
        let name = params
            .output_name
            .clone()
            .unwrap_or_else(|| default_output_name(Utc::now().date_naive()));
        let location = match self.persist(&dataset, &name).await {
            Ok(location) => location,
            Err(e) => return Err(run.fail(e)),
        };

        run.advance(RunState::Done)?;
        info!(
            location = %location,
            rows = dataset.num_rows(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );

        Ok(RunReport {
            location,
            rows_extracted,
            rows_persisted: dataset.num_rows(),
            validation,
            batch_stats,
            states: run.history,
        })
    }

    async fn persist(&self, dataset: &Dataset, name: &str) -> Result<String> {
        self.sink
            .persist(dataset, name)
            .await
            .map_err(|e| match e {
                Error::Sink { .. } => e,
                other => Error::sink(other.to_string()),
            })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("extractor", &self.extractor)
            .field("transformer", &self.transformer)
            .field("validator", &self.validator)
            .field("pacing_delay", &self.pacing_delay)
            .finish_non_exhaustive()
    }
}
