//! `submission-analytics` is a small library for loading schema-less record collections into an
//! in-memory [`types::RecordSet`] and running analytical queries over them.
//!
//! The primary ingestion entrypoint is [`ingestion::ingest_from_path`], which can auto-detect the
//! ingestion format from the file extension (or you can force a format via
//! [`ingestion::IngestionOptions`]).
//!
//! ## What you can ingest
//!
//! **File formats (auto-detected by extension):**
//!
//! - **CSV**: `.csv` (headers become attribute names, cell types are inferred)
//! - **JSON**: `.json` (array-of-objects) and `.ndjson` (newline-delimited objects)
//!
//! Ingestion is schema-less: every scalar member of an input record becomes a typed
//! [`types::Value`] attribute, and attributes may vary per record. Across formats, empty cells
//! and explicit JSON `null` ingest as *absent* attributes; there is no null value.
//!
//! ## Quick example: ingest data
//!
//! ```no_run
//! use submission_analytics::ingestion::{ingest_from_path, IngestionOptions};
//!
//! # fn main() -> Result<(), submission_analytics::IngestionError> {
//! // Auto-detects by extension (.csv/.json/.ndjson).
//! let records = ingest_from_path("submissions.ndjson", &IngestionOptions::default())?;
//! println!("records={}", records.record_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified ingestion entrypoints and format-specific implementations
//! - [`types`]: schema-less record + collection types
//! - [`processing`]: in-memory collection primitives (filter/map/fold/grouped reduce)
//! - [`analytics`]: submission queries (per-hour, per-time-bucket, per-title-length)
//! - [`execution`]: chunked parallel execution with throttling and metrics
//! - [`error`]: error types used across ingestion and queries
//!
//! ## Query example
//!
//! ```rust
//! use submission_analytics::analytics::{average_points_per_hour, count_per_hour};
//! use submission_analytics::types::{Record, RecordSet, Value};
//!
//! let records = RecordSet::new(vec![
//!     Record::new()
//!         .with("created_at_i", Value::Int64(60))
//!         .with("points", Value::Int64(120))
//!         .with("title", Value::Utf8("first post".into())),
//!     Record::new()
//!         .with("created_at_i", Value::Int64(7200))
//!         .with("points", Value::Int64(80))
//!         .with("title", Value::Utf8("second post".into())),
//! ]);
//!
//! let per_hour = count_per_hour(&records).unwrap();
//! assert_eq!(per_hour[&0], 1);
//! assert_eq!(per_hour[&2], 1);
//!
//! let averages = average_points_per_hour(&records).unwrap();
//! assert_eq!(averages[&0], 120.0);
//! ```
//!
//! Aggregations group with ordered maps and fail fast: a record missing a required attribute
//! (e.g. `created_at_i` during hour grouping) aborts the query with a
//! [`QueryError`] instead of silently skewing the result. The one deliberate
//! exception is titles: a record without a title counts as a zero-word title.

pub mod analytics;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{IngestionError, IngestionResult, QueryError, QueryResult};
