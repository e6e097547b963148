use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across CSV and JSON/NDJSON ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input is not in a shape this crate can ingest (not an object per
    /// record, bad glob pattern, unknown extension, ...).
    #[error("malformed input: {message}")]
    Malformed { message: String },

    /// A value could not be converted into a scalar [`crate::types::Value`].
    #[error("failed to ingest value at record {record} attribute '{attribute}': {message} (raw='{raw}')")]
    Parse {
        record: usize,
        attribute: String,
        raw: String,
        message: String,
    },
}

/// Convenience result type for analytics queries.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error type returned by analytics queries over a [`crate::types::RecordSet`].
///
/// Queries are pure one-shot computations: the first error aborts the whole
/// operation and no partial result is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// An operation that needs at least one record was given zero records.
    #[error("collection is empty: {operation} requires at least one record")]
    EmptyCollection { operation: &'static str },

    /// A record being aggregated is missing a required attribute.
    #[error("record {record} is missing required attribute '{attribute}'")]
    MissingField { record: usize, attribute: String },

    /// A required attribute is present but holds a value of the wrong type.
    #[error("record {record} attribute '{attribute}' has unexpected type (expected {expected})")]
    WrongType {
        record: usize,
        attribute: String,
        expected: &'static str,
    },

    /// A timestamp falls outside the range chrono can represent.
    #[error("timestamp {seconds} is outside the representable datetime range")]
    TimestampOutOfRange { seconds: i64 },
}
