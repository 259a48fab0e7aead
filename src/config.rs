//! Application configuration
//!
//! An [`AppConfig`] is read once from YAML, overlaid with environment
//! variables, validated, and then passed by value to the components that
//! need it.
//!
//! ```yaml
//! reddit:
//!   client_id: abc
//!   client_secret: xyz
//! pipeline:
//!   sort: top
//!   time_filter: week
//!   limit_per_partition: 100
//! validation:
//!   require_unique_ids: true
//! output:
//!   destination: s3://bucket/raw/reddit
//!   format: parquet
//!   partition_by_date: true
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::source::{DEFAULT_API_BASE, DEFAULT_TOKEN_URL, MAX_PAGE_SIZE};
use crate::types::{ExportFormat, LogLevel, SortMode, TimeFilter};
use crate::validate::ValidatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variables that override file values
pub const ENV_OVERRIDES: [&str; 5] = [
    "REDDIT_CLIENT_ID",
    "REDDIT_CLIENT_SECRET",
    "REDDIT_USER_AGENT",
    "OUTPUT_DESTINATION",
    "LOG_LEVEL",
];

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reddit API access
    #[serde(default)]
    pub reddit: RedditConfig,

    /// Run defaults
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Validation thresholds; the duplicate-id policy has no default
    pub validation: ValidatorConfig,

    /// Where datasets are written
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load from a YAML file, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML without overrides or validation
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))
    }

    /// Overlay values returned by `lookup` for the [`ENV_OVERRIDES`] keys
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get("REDDIT_CLIENT_ID") {
            self.reddit.client_id = id;
        }
        if let Some(secret) = get("REDDIT_CLIENT_SECRET") {
            self.reddit.client_secret = secret;
        }
        if let Some(agent) = get("REDDIT_USER_AGENT") {
            self.reddit.user_agent = agent;
        }
        if let Some(destination) = get("OUTPUT_DESTINATION") {
            self.output.destination = destination;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.pipeline.log_level = level
                .parse()
                .map_err(|_| Error::invalid_value("LOG_LEVEL", format!("unknown level '{level}'")))?;
        }
        Ok(())
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.reddit.client_id.trim().is_empty() {
            return Err(Error::missing_field("reddit.client_id"));
        }
        if self.reddit.client_secret.trim().is_empty() {
            return Err(Error::missing_field("reddit.client_secret"));
        }
        if self.reddit.user_agent.trim().is_empty() {
            return Err(Error::missing_field("reddit.user_agent"));
        }
        for (field, value) in [
            ("reddit.api_base", &self.reddit.api_base),
            ("reddit.token_url", &self.reddit.token_url),
        ] {
            url::Url::parse(value).map_err(|e| Error::invalid_value(field, e.to_string()))?;
        }
        if self.reddit.requests_per_minute == 0 {
            return Err(Error::invalid_value(
                "reddit.requests_per_minute",
                "must be greater than 0",
            ));
        }
        if self.reddit.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "reddit.timeout_seconds",
                "must be greater than 0",
            ));
        }

        let batch = self.pipeline.stream_batch_size;
        if batch == 0 || batch > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "pipeline.stream_batch_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.pipeline.limit_per_partition == Some(0) {
            return Err(Error::invalid_value(
                "pipeline.limit_per_partition",
                "must be greater than 0",
            ));
        }

        let pct = self.validation.max_null_percentage;
        if !(0.0..=100.0).contains(&pct) {
            return Err(Error::invalid_value(
                "validation.max_null_percentage",
                "must be between 0 and 100",
            ));
        }

        if self.output.destination.trim().is_empty() {
            return Err(Error::missing_field("output.destination"));
        }
        Ok(())
    }

    /// HTTP client settings for the Reddit API
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(&self.reddit.api_base)
            .timeout(Duration::from_secs(self.reddit.timeout_seconds))
            .max_retries(self.reddit.max_retries)
            .rate_limit(RateLimiterConfig::new(
                self.reddit.requests_per_minute,
                self.reddit.burst_size,
            ))
            .user_agent(&self.reddit.user_agent)
            .build()
    }
}

// ============================================================================
// Reddit
// ============================================================================

/// Reddit API credentials and client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// OAuth API host
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: default_user_agent(),
            api_base: default_api_base(),
            token_url: default_token_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_minute: default_requests_per_minute(),
            burst_size: default_burst_size(),
        }
    }
}

fn default_user_agent() -> String {
    format!("reddit-etl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_burst_size() -> u32 {
    5
}

// ============================================================================
// Pipeline
// ============================================================================

/// Defaults for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delay between partitions in milliseconds
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    #[serde(default)]
    pub sort: SortMode,

    #[serde(default)]
    pub time_filter: TimeFilter,

    /// `None` reads each listing to its end
    #[serde(default = "default_limit")]
    pub limit_per_partition: Option<usize>,

    /// Records per batch when streaming a partition
    #[serde(default = "default_stream_batch_size")]
    pub stream_batch_size: usize,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: default_pacing_delay_ms(),
            sort: SortMode::default(),
            time_filter: TimeFilter::default(),
            limit_per_partition: default_limit(),
            stream_batch_size: default_stream_batch_size(),
            log_level: LogLevel::default(),
        }
    }
}

impl PipelineConfig {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

fn default_pacing_delay_ms() -> u64 {
    1000
}

fn default_limit() -> Option<usize> {
    Some(100)
}

fn default_stream_batch_size() -> usize {
    MAX_PAGE_SIZE
}

// ============================================================================
// Output
// ============================================================================

/// Sink destination and file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Local directory or `s3://`, `r2://`, `gs://`, `az://` URL
    #[serde(default = "default_destination")]
    pub destination: String,

    #[serde(default)]
    pub format: ExportFormat,

    /// Write under `dt=YYYY-MM-DD/`
    #[serde(default)]
    pub partition_by_date: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            format: ExportFormat::default(),
            partition_by_date: false,
        }
    }
}

fn default_destination() -> String {
    "data/output".to_string()
}
