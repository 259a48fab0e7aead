//! Format-specific preparation before a dataset is written

use crate::dataset::{Dataset, Value};
use crate::types::ExportFormat;
use chrono::SecondsFormat;

/// Adjust cell representations for `format`; rows are never dropped
///
/// CSV gets text everywhere, with nulls as empty strings and timestamps
/// as `%Y-%m-%d %H:%M:%S`. JSON gets RFC 3339 timestamps and keeps nulls.
/// Parquet keeps native types.
pub fn prepare_for_export(dataset: Dataset, format: ExportFormat) -> Dataset {
    let convert: fn(Value) -> Value = match format {
        ExportFormat::Csv => |v| Value::Text(v.to_string()),
        ExportFormat::Json => |v| match v {
            Value::Timestamp(ts) => Value::Text(ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::Date(d) => Value::Text(Value::Date(d).to_string()),
            other => other,
        },
        ExportFormat::Parquet => return dataset,
    };

    dataset.map_values(convert)
}
