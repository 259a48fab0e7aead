//! Arrow schema inference and Dataset to Arrow conversion
//!
//! Column types are inferred from the kinds of the non-null cells. Int and
//! Float merge to Float64; any other mix, and all-null columns, become Utf8.

use crate::dataset::{Dataset, Value, ValueKind};
use crate::error::{Error, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate};
use std::sync::Arc;

const UTC: &str = "UTC";

/// Infer an Arrow schema from a dataset, keeping column order
pub fn infer_schema(dataset: &Dataset) -> Schema {
    let fields: Vec<Field> = dataset
        .columns()
        .iter()
        .map(|name| {
            let data_type = dataset
                .column_kinds(name)
                .into_iter()
                .map(kind_to_type)
                .reduce(|a, b| merge_types(&a, &b))
                .unwrap_or(DataType::Utf8);
            Field::new(name, data_type, true) // All fields nullable
        })
        .collect();

    Schema::new(fields)
}

/// Convert a dataset to a single Arrow RecordBatch
pub fn dataset_to_arrow(dataset: &Dataset) -> Result<RecordBatch> {
    let schema = Arc::new(infer_schema(dataset));

    if dataset.num_columns() == 0 {
        return Ok(RecordBatch::new_empty(schema));
    }

    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let values: Vec<&Value> = dataset
                .column(field.name())
                .map(Iterator::collect)
                .unwrap_or_default();
            build_array(&values, field.data_type())
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    RecordBatch::try_new(schema, columns)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}

fn kind_to_type(kind: ValueKind) -> DataType {
    match kind {
        ValueKind::Bool => DataType::Boolean,
        ValueKind::Int => DataType::Int64,
        ValueKind::Float => DataType::Float64,
        ValueKind::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into())),
        ValueKind::Date => DataType::Date32,
        ValueKind::Null | ValueKind::Text => DataType::Utf8,
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        _ => DataType::Utf8,
    }
}

fn build_array(values: &[&Value], data_type: &DataType) -> Result<ArrayRef> {
    let array: ArrayRef = match data_type {
        DataType::Boolean => Arc::new(
            values
                .iter()
                .map(|v| v.as_bool())
                .collect::<BooleanArray>(),
        ),
        DataType::Int64 => Arc::new(values.iter().map(|v| v.as_i64()).collect::<Int64Array>()),
        DataType::Float64 => Arc::new(values.iter().map(|v| v.as_f64()).collect::<Float64Array>()),
        DataType::Timestamp(TimeUnit::Microsecond, _) => Arc::new(
            values
                .iter()
                .map(|v| v.as_timestamp().map(|ts| ts.timestamp_micros()))
                .collect::<TimestampMicrosecondArray>()
                .with_timezone(UTC),
        ),
        DataType::Date32 => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    Value::Date(d) => Some(days_since_epoch(*d)),
                    _ => None,
                })
                .collect::<Date32Array>(),
        ),
        DataType::Utf8 => Arc::new(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect::<StringArray>(),
        ),
        other => {
            return Err(Error::output(format!(
                "Unsupported column type for export: {other}"
            )))
        }
    };
    Ok(array)
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - DateTime::UNIX_EPOCH.date_naive()).num_days() as i32
}
