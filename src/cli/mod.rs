//! CLI module
//!
//! Command-line interface for running the pipeline.
//!
//! # Commands
//!
//! - `run` - Extract, transform, validate and persist
//! - `extract` - Stream one subreddit as JSON lines
//! - `check` - Test connection to the API

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
