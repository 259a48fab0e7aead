//! Output module
//!
//! Turns a validated dataset into a file and stores it.
//!
//! # Overview
//!
//! - Inferring Arrow schemas from datasets and building RecordBatches
//! - Encoding CSV, JSON and Parquet files
//! - Local and cloud storage destinations (S3, R2, GCS, Azure)
//! - The [`Sink`] capability the pipeline persists through

mod cloud;
mod schema;
mod sink;
mod writer;

pub use cloud::{build_object_key, CloudDestination};
pub use schema::{dataset_to_arrow, infer_schema};
pub use sink::{Sink, StoreSink};
pub use writer::{encode, encode_csv, encode_json, encode_parquet, ParquetWriterConfig};
