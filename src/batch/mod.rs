//! Multi-partition extraction
//!
//! [`BatchExtractor`] walks partitions in order, isolating failures, and
//! merges what it gets into one [`Dataset`] over [`POST_FIELDS`].

mod types;

pub use types::{BatchStats, PartitionFailure};

use crate::dataset::{Dataset, Value};
use crate::error::Result;
use crate::source::{RawRecord, SourceClient, POST_FIELDS};
use crate::types::{SortMode, TimeFilter};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Drives a [`SourceClient`] across partitions
#[derive(Debug)]
pub struct BatchExtractor {
    client: SourceClient,
}

impl BatchExtractor {
    pub fn new(client: SourceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SourceClient {
        &self.client
    }

    /// Extract every partition and merge the results
    ///
    /// A failing partition is logged and skipped. `pacing_delay` is slept
    /// between consecutive partitions. When nothing could be extracted the
    /// result is an empty dataset with no columns.
    pub async fn extract_many(
        &self,
        partitions: &[String],
        sort: SortMode,
        time_filter: TimeFilter,
        limit_per_partition: Option<usize>,
        pacing_delay: Duration,
    ) -> Result<Dataset> {
        let (dataset, _) = self
            .extract_many_with_stats(partitions, sort, time_filter, limit_per_partition, pacing_delay)
            .await?;
        Ok(dataset)
    }

    /// [`extract_many`](Self::extract_many), also returning per-run counters
    pub async fn extract_many_with_stats(
        &self,
        partitions: &[String],
        sort: SortMode,
        time_filter: TimeFilter,
        limit_per_partition: Option<usize>,
        pacing_delay: Duration,
    ) -> Result<(Dataset, BatchStats)> {
        let start = Instant::now();
        let mut stats = BatchStats::new();
        let mut records = Vec::new();

        for (index, partition) in partitions.iter().enumerate() {
            if index > 0 && !pacing_delay.is_zero() {
                tokio::time::sleep(pacing_delay).await;
            }

            match self
                .client
                .extract_partition(partition, sort, time_filter, limit_per_partition)
                .await
            {
                Ok(batch) => {
                    stats.add_success(batch.len());
                    records.extend(batch);
                }
                Err(e) => {
                    error!(partition = %partition, error = %e, "Failed to extract partition");
                    stats.add_failure(partition.as_str(), e.to_string());
                }
            }
        }

        stats.set_duration(start.elapsed().as_millis() as u64);

        if records.is_empty() {
            warn!(
                partitions = partitions.len(),
                failed = stats.partitions_failed,
                "No posts extracted from any partition"
            );
            return Ok((Dataset::empty(), stats));
        }

        let dataset = records_to_dataset(records)?;
        info!(
            rows = dataset.num_rows(),
            partitions = partitions.len(),
            failed = stats.partitions_failed,
            "Combined extracted posts"
        );
        Ok((dataset, stats))
    }
}

/// Lay records out as rows over [`POST_FIELDS`]
pub fn records_to_dataset(records: Vec<RawRecord>) -> Result<Dataset> {
    let rows = records
        .into_iter()
        .map(|record| {
            POST_FIELDS
                .iter()
                .map(|field| record.get(field).map_or(Value::Null, Value::from_json))
                .collect()
        })
        .collect();
    Dataset::from_rows(POST_FIELDS, rows)
}
