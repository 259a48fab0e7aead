// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # reddit-etl
//!
//! Extracts posts from Reddit, turns them into a typed tabular dataset,
//! gates it with tiered validation rules, and persists it to local disk or
//! object storage.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reddit_etl::{
//!     batch::BatchExtractor, output::StoreSink, pipeline::{Pipeline, RunParams},
//!     source::{RedditSource, SourceClient}, transform::Transformer,
//!     validate::{Validator, ValidatorConfig}, ExportFormat, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = RedditSource::with_credentials(http, token_url, "id", "secret")?;
//!     let pipeline = Pipeline::new(
//!         BatchExtractor::new(SourceClient::new(source)),
//!         Transformer::new(),
//!         Validator::new(ValidatorConfig::new(true)),
//!         StoreSink::from_url("data/output", ExportFormat::Csv)?,
//!     );
//!
//!     let location = pipeline.run(&RunParams::new(["rust", "golang"])).await?;
//!     println!("wrote {location}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Pipeline                              │
//! │  INIT → EXTRACTING → TRANSFORMING → VALIDATING → PERSISTING     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Source  │   Batch   │   Transform   │ Validate  │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Reddit   │ Isolation │ Coerce types  │ Structure │ CSV         │
//! │ Memory   │ Pacing    │ Clean         │ Quality   │ JSON        │
//! │ Stream   │ Stats     │ Features      │ Business  │ Parquet     │
//! │ Probe    │           │ Deduplicate   │ Schema    │ S3/GCS/Az   │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//!      │
//! ┌────┴─────┬───────────┐
//! │   Auth   │   HTTP    │
//! │ OAuth2   │ Retry     │
//! │          │ Rate Limit│
//! └──────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Typed tabular dataset
pub mod dataset;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Listing sources and per-item extraction
pub mod source;

/// Multi-partition extraction
pub mod batch;

/// Transformation stages
pub mod transform;

/// Tiered dataset validation
pub mod validate;

/// Arrow conversion, file encoding and storage sinks
pub mod output;

/// Run orchestration and state machine
pub mod pipeline;

/// Application configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use dataset::{Dataset, Value};
pub use pipeline::{Pipeline, RunParams, RunReport, RunState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
