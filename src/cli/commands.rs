//! CLI commands and argument parsing

use crate::types::{ExportFormat, SortMode, TimeFilter};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reddit extract, transform, validate and persist pipeline
#[derive(Parser, Debug)]
#[command(name = "reddit-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, transform, validate and persist posts from subreddits
    Run {
        /// Subreddits to extract (comma-separated or repeated)
        #[arg(required = true, value_delimiter = ',')]
        partitions: Vec<String>,

        /// Listing sort (top, hot, new, rising)
        #[arg(long)]
        sort: Option<SortMode>,

        /// Time window for `top` (hour, day, week, month, year, all)
        #[arg(long)]
        time_filter: Option<TimeFilter>,

        /// Maximum posts per subreddit
        #[arg(long)]
        limit: Option<usize>,

        /// Name of the written dataset (default: reddit_YYYYMMDD)
        #[arg(long)]
        output_name: Option<String>,

        /// Skip the validation gate
        #[arg(long)]
        no_validate: bool,

        /// Persist raw extracted fields without transformation
        #[arg(long)]
        no_transform: bool,

        /// File format (csv, json, parquet)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Output destination (local path or cloud URL)
        /// Supports: /path, s3://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Stream top posts of one subreddit as JSON lines, one per batch
    Extract {
        /// Subreddit to read
        partition: String,

        /// Time window (hour, day, week, month, year, all)
        #[arg(long)]
        time_filter: Option<TimeFilter>,

        /// Records per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Stop after this many batches
        #[arg(long)]
        max_batches: Option<usize>,
    },

    /// Validate configuration and test the connection to the API
    Check {
        /// Subreddit used for the probe request
        #[arg(long, default_value = "all")]
        partition: String,
    },
}
