//! Error types for reddit-etl
//!
//! This module defines the error hierarchy for the whole pipeline.
//! Failures below partition granularity are absorbed where they happen;
//! everything at dataset granularity ends up wrapped in
//! [`Error::Pipeline`] with the stage that raised it.

use crate::pipeline::RunState;
use thiserror::Error;

/// The main error type for reddit-etl
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("OAuth2 error: {message}")]
    OAuth2 { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Failed to extract field '{field}': {message}")]
    ItemExtraction { field: String, message: String },

    #[error("Source unavailable for partition '{partition}': {message}")]
    SourceUnavailable { partition: String, message: String },

    #[error("No data extracted from any partition")]
    EmptyBatch,

    // ============================================================================
    // Processing Errors
    // ============================================================================
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Data transformation failed in stage '{stage}': {message}")]
    Transformation { stage: String, message: String },

    #[error("Data validation failed: {}", errors.join(", "))]
    ValidationFailed { errors: Vec<String> },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Sink failure: {message}")]
    Sink { message: String },

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Pipeline failed during {stage}: {source}")]
    Pipeline {
        stage: RunState,
        #[source]
        source: Box<Error>,
    },

    #[error("Illegal pipeline transition from {from} to {to}")]
    IllegalTransition { from: RunState, to: RunState },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an item extraction error
    pub fn item_extraction(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ItemExtraction {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a source unavailable error
    pub fn source_unavailable(partition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            partition: partition.into(),
            message: message.into(),
        }
    }

    /// Create a dataset shape error
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Create a transformation error for a named stage
    pub fn transformation(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transformation {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a sink error
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }

    /// Wrap an error with the pipeline stage it was raised in
    pub fn pipeline(stage: RunState, source: Error) -> Self {
        Self::Pipeline {
            stage,
            source: Box::new(source),
        }
    }

    /// The pipeline stage this error was raised in, if it is a pipeline failure
    pub fn stage(&self) -> Option<RunState> {
        match self {
            Error::Pipeline { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the HTTP client may retry the request that raised this error
    ///
    /// Transport errors count only for failed connects and timeouts.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Server-side statuses worth another attempt; 429 arrives as
/// [`Error::RateLimited`] instead
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 500 | 502 | 503 | 504 | 520..=524)
}

/// Result type alias for reddit-etl
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", message.into(), e.into())))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", f(), e.into())))
    }
}
