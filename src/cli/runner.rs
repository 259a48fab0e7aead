//! CLI runner - executes commands

use crate::batch::BatchExtractor;
use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::output::StoreSink;
use crate::pipeline::{Pipeline, RunParams};
use crate::source::{RedditSource, SourceClient};
use crate::transform::Transformer;
use crate::types::{ExportFormat, TimeFilter};
use crate::validate::Validator;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
    config: AppConfig,
}

impl Runner {
    /// Create a runner for parsed arguments and a loaded configuration
    pub fn new(cli: Cli, config: AppConfig) -> Self {
        Self { cli, config }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                partitions,
                sort,
                time_filter,
                limit,
                output_name,
                no_validate,
                no_transform,
                format,
                output,
            } => {
                let mut params = RunParams::new(partitions.iter().cloned())
                    .sort(sort.unwrap_or(self.config.pipeline.sort))
                    .time_filter(time_filter.unwrap_or(self.config.pipeline.time_filter))
                    .validate(!no_validate)
                    .transform(!no_transform);
                params.limit_per_partition = limit.or(self.config.pipeline.limit_per_partition);
                params.output_name.clone_from(output_name);

                let format = format.unwrap_or(self.config.output.format);
                self.run_pipeline(&params, format, output.as_deref()).await
            }
            Commands::Extract {
                partition,
                time_filter,
                batch_size,
                max_batches,
            } => {
                self.extract(
                    partition,
                    time_filter.unwrap_or(self.config.pipeline.time_filter),
                    batch_size.unwrap_or(self.config.pipeline.stream_batch_size),
                    *max_batches,
                )
                .await
            }
            Commands::Check { partition } => self.check(partition).await,
        }
    }

    /// Source client for the configured Reddit credentials
    fn source_client(&self) -> Result<SourceClient> {
        let reddit = &self.config.reddit;
        let source = RedditSource::with_credentials(
            self.config.http_config(),
            &reddit.token_url,
            &reddit.client_id,
            &reddit.client_secret,
        )?;
        Ok(SourceClient::new(source))
    }

    async fn run_pipeline(
        &self,
        params: &RunParams,
        format: ExportFormat,
        output: Option<&str>,
    ) -> Result<()> {
        let destination = output.unwrap_or(&self.config.output.destination);
        let sink = StoreSink::from_url(destination, format)?
            .partition_by_date(self.config.output.partition_by_date);

        let pipeline = Pipeline::new(
            BatchExtractor::new(self.source_client()?),
            Transformer::new(),
            Validator::new(self.config.validation.clone()),
            sink,
        )
        .with_pacing_delay(self.config.pipeline.pacing_delay());

        info!(destination = %destination, format = format.extension(), "Running pipeline");
        let report = pipeline.run_with_report(params).await?;

        self.output_message(&json!({
            "type": "RUN_REPORT",
            "report": report,
        }));
        Ok(())
    }

    async fn extract(
        &self,
        partition: &str,
        time_filter: TimeFilter,
        batch_size: usize,
        max_batches: Option<usize>,
    ) -> Result<()> {
        if batch_size == 0 {
            return Err(Error::invalid_argument("batch size must be greater than 0"));
        }

        let client = self.source_client()?;
        let mut stream = client.stream_partition(partition, time_filter, batch_size);
        let mut batches = 0usize;
        let mut records = 0usize;

        while let Some(batch) = stream.next().await {
            let batch = batch?;
            batches += 1;
            records += batch.len();
            self.output_message(&json!({
                "type": "RECORDS",
                "partition": partition,
                "batch": batches,
                "records": batch,
            }));
            if max_batches.is_some_and(|max| batches >= max) {
                break;
            }
        }

        info!(partition = %partition, batches, records, "Extraction finished");
        Ok(())
    }

    async fn check(&self, partition: &str) -> Result<()> {
        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Checking connection to {}", self.config.reddit.api_base)
            }
        }));

        let status = match self.source_client()?.probe(partition).await {
            Ok(sample) => json!({
                "status": "SUCCEEDED",
                "message": "Connection successful",
                "sample_id": sample.and_then(|r| r.id().map(ToString::to_string)),
            }),
            Err(e) => json!({
                "status": "FAILED",
                "message": format!("Connection failed: {e}"),
            }),
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": status,
        }));
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        let text = if self.cli.pretty {
            serde_json::to_string_pretty(msg)
        } else {
            serde_json::to_string(msg)
        };
        println!("{}", text.unwrap_or_default());
    }
}
