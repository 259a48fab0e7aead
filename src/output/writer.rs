//! Dataset serialization
//!
//! Encodes a dataset into the bytes of one output file. CSV and Parquet go
//! through an Arrow RecordBatch; JSON is written as an array of records.

use super::schema::dataset_to_arrow;
use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};
use crate::transform::prepare_for_export;
use crate::types::ExportFormat;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Configuration for Parquet output
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Encode a dataset as one file in `format`
pub fn encode(dataset: &Dataset, format: ExportFormat, parquet: &ParquetWriterConfig) -> Result<Bytes> {
    let prepared = prepare_for_export(dataset.clone(), format);
    match format {
        ExportFormat::Csv => encode_csv(&prepared),
        ExportFormat::Json => encode_json(&prepared),
        ExportFormat::Parquet => encode_parquet(&prepared, parquet),
    }
}

/// CSV with a header row, columns in dataset order
pub fn encode_csv(dataset: &Dataset) -> Result<Bytes> {
    let batch = dataset_to_arrow(dataset)?;
    let mut buffer = Vec::new();
    {
        let mut writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(&mut buffer);
        writer.write(&batch)?;
    }
    Ok(Bytes::from(buffer))
}

/// A JSON array with one object per row, keys in column order
pub fn encode_json(dataset: &Dataset) -> Result<Bytes> {
    serde_json::to_vec(&Records(dataset))
        .map(Bytes::from)
        .map_err(|e| Error::output(format!("Failed to encode JSON: {e}")))
}

/// Parquet with native column types
pub fn encode_parquet(dataset: &Dataset, config: &ParquetWriterConfig) -> Result<Bytes> {
    let batch = dataset_to_arrow(dataset)?;
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(
        &mut buffer,
        batch.schema(),
        Some(config.build_properties()),
    )
    .map_err(|e| Error::output(format!("Failed to create Parquet writer: {e}")))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(Bytes::from(buffer))
}

struct Records<'a>(&'a Dataset);

struct Record<'a> {
    columns: &'a [String],
    row: &'a [Value],
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.num_rows()))?;
        for row in self.0.rows() {
            seq.serialize_element(&Record {
                columns: self.0.columns(),
                row,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
