//! In-memory collection transformations.
//!
//! The processing layer operates on [`crate::types::RecordSet`] values produced by ingestion.
//! It is intentionally simple and purely in-memory.
//!
//! Currently implemented:
//!
//! - [`filter()`]: record filtering by predicate
//! - [`map()`]: record mapping by user function
//! - [`fold()`]: collection-wide reduction into a single accumulator
//! - [`count_by_key()`] / [`reduce_by_key()`]: key-grouped reduction
//!
//! ## Example: filter → group → reduce
//!
//! ```rust
//! use submission_analytics::processing::{filter, reduce_by_key, MeanAccumulator};
//! use submission_analytics::types::{Record, RecordSet, Value};
//!
//! let records = RecordSet::new(vec![
//!     Record::new().with("host", Value::Utf8("a".into())).with("ms", Value::Int64(10)),
//!     Record::new().with("host", Value::Utf8("a".into())).with("ms", Value::Int64(30)),
//!     Record::new().with("host", Value::Utf8("b".into())).with("ms", Value::Int64(5)),
//! ]);
//!
//! // Keep only fast responses.
//! let fast = filter(&records, |r| matches!(r.int("ms"), Some(ms) if ms < 20));
//! assert_eq!(fast.record_count(), 2);
//!
//! // Mean latency per host over the full collection.
//! let means = reduce_by_key(
//!     &records,
//!     |_, r| Ok(r.text("host").unwrap_or("").to_string()),
//!     |_, r| Ok(MeanAccumulator::of(r.number("ms").unwrap_or(0.0))),
//!     |acc, other| acc.merge(other),
//! )
//! .unwrap();
//! assert_eq!(means["a"].mean(), 20.0);
//! assert_eq!(means["b"].mean(), 5.0);
//! ```

pub mod filter;
pub mod map;
pub mod reduce;

pub use filter::filter;
pub use map::map;
pub use reduce::{count_by_key, fold, reduce_by_key, MeanAccumulator, ProportionAccumulator};
