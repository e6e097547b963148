//! CSV ingestion implementation.

use std::path::Path;

use crate::error::IngestionResult;
use crate::types::{Record, RecordSet, Value};

/// Ingest a CSV file into an in-memory [`RecordSet`].
///
/// Rules:
///
/// - CSV must have headers; headers become attribute names.
/// - Empty cells produce absent attributes (the record simply has fewer attributes).
/// - Non-empty cells are type-inferred: integer, then float, then bool (`true`/`false`,
///   case-insensitive), then string.
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<RecordSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<RecordSet> {
    let headers = rdr.headers()?.clone();

    let mut records: Vec<Record> = Vec::new();
    for result in rdr.records() {
        let row = result?;

        let mut record = Record::new();
        for (header, raw) in headers.iter().zip(row.iter()) {
            if let Some(value) = infer_value(raw) {
                record.attributes.insert(header.to_string(), value);
            }
        }
        records.push(record);
    }

    Ok(RecordSet::new(records))
}

/// Infer a scalar value from a raw CSV cell. Empty cells are absent attributes.
fn infer_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Int64(i));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Some(Value::Float64(f));
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => Some(Value::Utf8(trimmed.to_owned())),
    }
}
