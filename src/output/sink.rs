//! Dataset persistence

use super::cloud::{build_object_key, CloudDestination};
use super::writer::{encode, ParquetWriterConfig};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::ExportFormat;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::time::Instant;
use tracing::info;

/// Somewhere a validated dataset can be written
#[async_trait]
pub trait Sink: Send + Sync {
    /// Persist `dataset` under a name derived from `location_hint` and
    /// return where it landed
    async fn persist(&self, dataset: &Dataset, location_hint: &str) -> Result<String>;
}

/// Sink writing one file per run to a [`CloudDestination`]
#[derive(Debug, Clone)]
pub struct StoreSink {
    destination: CloudDestination,
    format: ExportFormat,
    partition_by_date: bool,
    partition_date: Option<NaiveDate>,
    parquet: ParquetWriterConfig,
}

impl StoreSink {
    pub fn new(destination: CloudDestination, format: ExportFormat) -> Self {
        Self {
            destination,
            format,
            partition_by_date: false,
            partition_date: None,
            parquet: ParquetWriterConfig::default(),
        }
    }

    /// Parse `url` into a destination and build a sink on it
    pub fn from_url(url: &str, format: ExportFormat) -> Result<Self> {
        Ok(Self::new(CloudDestination::parse(url)?, format))
    }

    /// Place files under a `dt=YYYY-MM-DD/` directory
    #[must_use]
    pub fn partition_by_date(mut self, enabled: bool) -> Self {
        self.partition_by_date = enabled;
        self
    }

    /// Partition under a fixed date instead of today's
    #[must_use]
    pub fn with_partition_date(mut self, date: NaiveDate) -> Self {
        self.partition_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_parquet_config(mut self, config: ParquetWriterConfig) -> Self {
        self.parquet = config;
        self
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn destination(&self) -> &CloudDestination {
        &self.destination
    }

    /// Object key a dataset named `location_hint` is written under
    pub fn object_key(&self, location_hint: &str) -> String {
        let date = self
            .partition_by_date
            .then(|| self.partition_date.unwrap_or_else(|| Utc::now().date_naive()));
        build_object_key(location_hint, self.format.extension(), date)
    }
}

#[async_trait]
impl Sink for StoreSink {
    async fn persist(&self, dataset: &Dataset, location_hint: &str) -> Result<String> {
        let start = Instant::now();
        let data = encode(dataset, self.format, &self.parquet)?;
        let bytes = data.len();

        let location = self
            .destination
            .write(&self.object_key(location_hint), data)
            .await?;

        info!(
            location = %location,
            rows = dataset.num_rows(),
            bytes,
            format = self.format.extension(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Persisted dataset"
        );
        Ok(location)
    }
}
