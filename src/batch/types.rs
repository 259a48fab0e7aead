//! Batch extraction types

use serde::Serialize;

/// A partition that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionFailure {
    pub partition: String,
    pub message: String,
}

/// Counters for one multi-partition extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub partitions_attempted: usize,
    pub partitions_succeeded: usize,
    pub partitions_failed: usize,
    /// Records across all successful partitions
    pub records_extracted: usize,
    pub duration_ms: u64,
    /// Failed partitions in the order they were attempted
    pub failures: Vec<PartitionFailure>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, records: usize) {
        self.partitions_attempted += 1;
        self.partitions_succeeded += 1;
        self.records_extracted += records;
    }

    pub fn add_failure(&mut self, partition: impl Into<String>, message: impl Into<String>) {
        self.partitions_attempted += 1;
        self.partitions_failed += 1;
        self.failures.push(PartitionFailure {
            partition: partition.into(),
            message: message.into(),
        });
    }

    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// True when every attempted partition failed
    pub fn all_failed(&self) -> bool {
        self.partitions_succeeded == 0
    }
}
