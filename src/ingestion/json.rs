//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object (one record)
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Ingestion is schema-less: every scalar member of an object becomes a record attribute. JSON
//! `null` members are dropped (the attribute is absent); nested arrays/objects are rejected.

use std::fs;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Record, RecordSet, Value};

/// Ingest JSON into an in-memory [`RecordSet`].
pub fn ingest_json_from_path(path: impl AsRef<Path>) -> IngestionResult<RecordSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text)
}

/// Ingest JSON from an in-memory string into a [`RecordSet`].
pub fn ingest_json_from_str(input: &str) -> IngestionResult<RecordSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::Malformed {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => ingest_json_values(&items),
            serde_json::Value::Object(_) => ingest_json_values(std::slice::from_ref(&v)),
            _ => Err(IngestionError::Malformed {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                IngestionError::Malformed {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        ingest_json_values(&values)
    }
}

fn ingest_json_values(values: &[serde_json::Value]) -> IngestionResult<RecordSet> {
    let mut records: Vec<Record> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let record_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| IngestionError::Malformed {
            message: format!("record {record_num} is not a json object"),
        })?;

        let mut record = Record::new();
        for (name, jv) in obj {
            if let Some(value) = convert_json_value(record_num, name, jv)? {
                record.attributes.insert(name.clone(), value);
            }
        }
        records.push(record);
    }

    Ok(RecordSet::new(records))
}

/// Convert one JSON member into a scalar [`Value`].
///
/// `null` converts to `None` (the attribute is simply absent from the record); nested arrays
/// and objects are an error because records hold only scalars.
fn convert_json_value(
    record: usize,
    attribute: &str,
    v: &serde_json::Value,
) -> IngestionResult<Option<Value>> {
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Bool(b) => Ok(Some(Value::Bool(*b))),
        serde_json::Value::String(s) => Ok(Some(Value::Utf8(s.clone()))),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(Value::Int64(i)))
            } else if let Some(f) = n.as_f64() {
                Ok(Some(Value::Float64(f)))
            } else {
                Err(IngestionError::Parse {
                    record,
                    attribute: attribute.to_string(),
                    raw: v.to_string(),
                    message: "number out of range for i64/f64".to_string(),
                })
            }
        }
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(IngestionError::Parse {
            record,
            attribute: attribute.to_string(),
            raw: v.to_string(),
            message: "expected a scalar (records hold no nested values)".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::ingest_json_from_str;
    use crate::types::Value;

    #[test]
    fn null_members_become_absent_attributes() {
        let records = ingest_json_from_str(r#"[{"a":1,"b":null}]"#).unwrap();
        assert_eq!(records.records[0].int("a"), Some(1));
        assert!(records.records[0].get("b").is_none());
    }

    #[test]
    fn integers_stay_integers_and_floats_stay_floats() {
        let records = ingest_json_from_str(r#"[{"i":3,"f":3.5}]"#).unwrap();
        assert_eq!(records.records[0].get("i"), Some(&Value::Int64(3)));
        assert_eq!(records.records[0].get("f"), Some(&Value::Float64(3.5)));
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = ingest_json_from_str(r#"[{"a":{"b":1}}]"#).unwrap_err();
        assert!(err.to_string().contains("attribute 'a'"));
        assert!(err.to_string().contains("scalar"));
    }
}
