//! Analytical queries over submission collections.
//!
//! The queries in this module operate on Hacker-News-style submission records: an integer Unix
//! timestamp under [`CREATED_AT`], a numeric score under [`POINTS`], and a string title under
//! [`TITLE`]. Each query is a single pass (or a grouped-reduce pass) over the collection; errors
//! abort the whole query with no partial result.
//!
//! ```rust
//! use submission_analytics::analytics::{
//!     count_per_hour, count_per_title_length, success_proportion_per_hour,
//! };
//! use submission_analytics::types::{Record, RecordSet, Value};
//!
//! let records = RecordSet::new(vec![
//!     Record::new()
//!         .with("created_at_i", Value::Int64(0))
//!         .with("points", Value::Int64(300))
//!         .with("title", Value::Utf8("a b".into())),
//!     Record::new()
//!         .with("created_at_i", Value::Int64(3600))
//!         .with("points", Value::Int64(100))
//!         .with("title", Value::Utf8("".into())),
//! ]);
//!
//! let per_hour = count_per_hour(&records).unwrap();
//! assert_eq!(per_hour[&0], 1);
//! assert_eq!(per_hour[&1], 1);
//!
//! let successful = success_proportion_per_hour(&records, 200.0).unwrap();
//! assert_eq!(successful[&0], 1.0);
//! assert_eq!(successful[&1], 0.0);
//!
//! let lengths = count_per_title_length(&records);
//! assert_eq!(lengths[&2], 1);
//! assert_eq!(lengths[&0], 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use chrono::{DateTime, Timelike};
use regex::Regex;

use crate::error::{QueryError, QueryResult};
use crate::processing::{count_by_key, fold, reduce_by_key, MeanAccumulator, ProportionAccumulator};
use crate::types::{Record, RecordSet};

/// Attribute holding a submission's creation time as an integer Unix timestamp (seconds).
pub const CREATED_AT: &str = "created_at_i";
/// Attribute holding a submission's score.
pub const POINTS: &str = "points";
/// Attribute holding a submission's title.
pub const TITLE: &str = "title";

/// Number of equal-width time buckets used by [`count_per_bucket`].
pub const DEFAULT_BUCKET_COUNT: usize = 200;
/// Score a submission must exceed to count as successful.
pub const DEFAULT_SUCCESS_THRESHOLD: f64 = 200.0;

/// Word tokenizer used for title lengths: runs of word characters (alphanumerics and underscore,
/// Unicode classes).
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern compiles"));

/// The first record in iteration order.
///
/// Fails with [`QueryError::EmptyCollection`] when the collection is empty.
pub fn first_record(records: &RecordSet) -> QueryResult<&Record> {
    records.first().ok_or(QueryError::EmptyCollection {
        operation: "first_record",
    })
}

/// The union of all attribute-name sets across every record.
///
/// An empty collection yields an empty set.
pub fn distinct_attribute_names(records: &RecordSet) -> BTreeSet<String> {
    fold(records, BTreeSet::new(), |mut names, record| {
        names.extend(record.attribute_names().map(str::to_string));
        names
    })
}

/// Retain only records whose attribute-name set is exactly equal to the first record's.
///
/// Equality is set equality: a record with a subset or superset of the reference attributes is
/// dropped. Fails with [`QueryError::EmptyCollection`] when the collection is empty.
pub fn with_same_attributes_as_first(records: &RecordSet) -> QueryResult<RecordSet> {
    let reference = first_record(records)?.attribute_name_set();
    Ok(records.filter_records(|record| record.attribute_name_set() == reference))
}

/// Minimum and maximum of an integer attribute across all records, in one pass.
///
/// Fails with [`QueryError::EmptyCollection`] on an empty collection. A record missing the
/// attribute (or holding a non-integer value) aborts the query; absent values are never silently
/// excluded.
pub fn integer_range(records: &RecordSet, attribute: &str) -> QueryResult<(i64, i64)> {
    if records.is_empty() {
        return Err(QueryError::EmptyCollection {
            operation: "integer_range",
        });
    }

    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for (index, record) in records.iter().enumerate() {
        let value = required_i64(index, record, attribute)?;
        min = min.min(value);
        max = max.max(value);
    }
    Ok((min, max))
}

/// Minimum and maximum [`CREATED_AT`] timestamp in the collection.
pub fn timestamp_range(records: &RecordSet) -> QueryResult<(i64, i64)> {
    integer_range(records, CREATED_AT)
}

/// Index of the equal-width time bucket `ts` falls into.
///
/// `interval = (max_ts - min_ts + 1) / bucket_count` in floating point; the index is
/// `(ts - min_ts) / interval` truncated toward zero. For timestamps within `[min_ts, max_ts]`
/// the index lands in `[0, bucket_count - 1]`, except that floating-point rounding of huge
/// ranges (beyond 2^53) can yield `bucket_count` itself; callers get that edge index as-is.
pub fn bucket_index(ts: i64, min_ts: i64, max_ts: i64, bucket_count: usize) -> i64 {
    let interval = (max_ts - min_ts + 1) as f64 / bucket_count as f64;
    ((ts - min_ts) as f64 / interval) as i64
}

/// Number of records per time bucket, over [`DEFAULT_BUCKET_COUNT`] buckets.
///
/// The timestamp range is derived from the collection itself; every record lands in exactly one
/// bucket, so the counts sum to the record count.
pub fn count_per_bucket(records: &RecordSet) -> QueryResult<BTreeMap<i64, u64>> {
    count_per_bucket_with(records, DEFAULT_BUCKET_COUNT)
}

/// Number of records per time bucket, over `bucket_count` buckets.
pub fn count_per_bucket_with(
    records: &RecordSet,
    bucket_count: usize,
) -> QueryResult<BTreeMap<i64, u64>> {
    let (min_ts, max_ts) = timestamp_range(records)?;
    reduce_by_key(
        records,
        |index, record| {
            Ok(bucket_index(
                required_i64(index, record, CREATED_AT)?,
                min_ts,
                max_ts,
                bucket_count,
            ))
        },
        |_, _| Ok(1u64),
        |count, one| *count += one,
    )
}

/// UTC hour-of-day (0..=23) for an integer Unix timestamp.
///
/// Fails with [`QueryError::TimestampOutOfRange`] for timestamps chrono cannot represent.
pub fn hour_of_timestamp(ts: i64) -> QueryResult<u32> {
    let datetime =
        DateTime::from_timestamp(ts, 0).ok_or(QueryError::TimestampOutOfRange { seconds: ts })?;
    Ok(datetime.hour())
}

/// Number of records per UTC hour-of-day.
pub fn count_per_hour(records: &RecordSet) -> QueryResult<BTreeMap<u32, u64>> {
    reduce_by_key(
        records,
        record_hour,
        |_, _| Ok(1u64),
        |count, one| *count += one,
    )
}

/// Arithmetic mean of [`POINTS`] per UTC hour-of-day.
pub fn average_points_per_hour(records: &RecordSet) -> QueryResult<BTreeMap<u32, f64>> {
    let accumulators = reduce_by_key(
        records,
        record_hour,
        |index, record| Ok(MeanAccumulator::of(required_f64(index, record, POINTS)?)),
        MeanAccumulator::merge,
    )?;
    Ok(accumulators
        .into_iter()
        .map(|(hour, acc)| (hour, acc.mean()))
        .collect())
}

/// Proportion of successful records (score strictly above `threshold`) per UTC hour-of-day.
pub fn success_proportion_per_hour(
    records: &RecordSet,
    threshold: f64,
) -> QueryResult<BTreeMap<u32, f64>> {
    let accumulators = reduce_by_key(
        records,
        record_hour,
        |index, record| {
            Ok(ProportionAccumulator::of(
                required_f64(index, record, POINTS)? > threshold,
            ))
        },
        ProportionAccumulator::merge,
    )?;
    Ok(accumulators
        .into_iter()
        .map(|(hour, acc)| (hour, acc.proportion()))
        .collect())
}

/// Number of words in a record's title.
///
/// A record with no [`TITLE`] attribute (or a non-string one) counts as length 0 by explicit
/// policy; a missing title is never an error.
pub fn title_word_count(record: &Record) -> usize {
    match record.text(TITLE) {
        Some(title) => WORD.find_iter(title).count(),
        None => 0,
    }
}

/// Number of records per title word count. Infallible.
pub fn count_per_title_length(records: &RecordSet) -> BTreeMap<usize, u64> {
    count_by_key(records, title_word_count)
}

/// Proportion of successful records (score strictly above `threshold`) per title word count.
pub fn success_proportion_per_title_length(
    records: &RecordSet,
    threshold: f64,
) -> QueryResult<BTreeMap<usize, f64>> {
    let accumulators = reduce_by_key(
        records,
        |_, record| Ok(title_word_count(record)),
        |index, record| {
            Ok(ProportionAccumulator::of(
                required_f64(index, record, POINTS)? > threshold,
            ))
        },
        ProportionAccumulator::merge,
    )?;
    Ok(accumulators
        .into_iter()
        .map(|(length, acc)| (length, acc.proportion()))
        .collect())
}

fn record_hour(index: usize, record: &Record) -> QueryResult<u32> {
    hour_of_timestamp(required_i64(index, record, CREATED_AT)?)
}

fn required_i64(index: usize, record: &Record, attribute: &str) -> QueryResult<i64> {
    match record.get(attribute) {
        Some(value) => value.as_i64().ok_or_else(|| QueryError::WrongType {
            record: index,
            attribute: attribute.to_string(),
            expected: "integer",
        }),
        None => Err(QueryError::MissingField {
            record: index,
            attribute: attribute.to_string(),
        }),
    }
}

fn required_f64(index: usize, record: &Record, attribute: &str) -> QueryResult<f64> {
    match record.get(attribute) {
        Some(value) => value.as_f64().ok_or_else(|| QueryError::WrongType {
            record: index,
            attribute: attribute.to_string(),
            expected: "number",
        }),
        None => Err(QueryError::MissingField {
            record: index,
            attribute: attribute.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn submission(ts: i64, points: i64, title: &str) -> Record {
        Record::new()
            .with(CREATED_AT, Value::Int64(ts))
            .with(POINTS, Value::Int64(points))
            .with(TITLE, Value::Utf8(title.to_string()))
    }

    #[test]
    fn first_record_fails_on_empty_collection() {
        let empty = RecordSet::default();
        assert_eq!(
            first_record(&empty).unwrap_err(),
            QueryError::EmptyCollection {
                operation: "first_record"
            }
        );
    }

    #[test]
    fn distinct_attribute_names_is_the_union() {
        let records = RecordSet::new(vec![
            Record::new().with("a", Value::Int64(1)).with("b", Value::Int64(2)),
            Record::new().with("b", Value::Int64(3)).with("c", Value::Int64(4)),
            Record::new(),
        ]);
        let names = distinct_attribute_names(&records);
        assert_eq!(
            names.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert!(distinct_attribute_names(&RecordSet::default()).is_empty());
    }

    #[test]
    fn same_attributes_filter_uses_set_equality() {
        let records = RecordSet::new(vec![
            Record::new().with("a", Value::Int64(1)).with("b", Value::Int64(2)),
            // subset: dropped
            Record::new().with("a", Value::Int64(3)),
            // superset: dropped
            Record::new()
                .with("a", Value::Int64(4))
                .with("b", Value::Int64(5))
                .with("c", Value::Int64(6)),
            // same names, different values: retained
            Record::new().with("b", Value::Int64(7)).with("a", Value::Int64(8)),
        ]);

        let out = with_same_attributes_as_first(&records).unwrap();
        assert_eq!(out.record_count(), 2);
        assert_eq!(out.records[0].int("a"), Some(1));
        assert_eq!(out.records[1].int("a"), Some(8));
    }

    #[test]
    fn timestamp_range_single_pass() {
        let records = RecordSet::new(vec![
            submission(50, 1, ""),
            submission(7, 1, ""),
            submission(120, 1, ""),
        ]);
        assert_eq!(timestamp_range(&records).unwrap(), (7, 120));
    }

    #[test]
    fn timestamp_range_fails_fast() {
        let empty = RecordSet::default();
        assert!(matches!(
            timestamp_range(&empty).unwrap_err(),
            QueryError::EmptyCollection { .. }
        ));

        let missing = RecordSet::new(vec![
            submission(50, 1, ""),
            Record::new().with(POINTS, Value::Int64(3)),
        ]);
        assert_eq!(
            timestamp_range(&missing).unwrap_err(),
            QueryError::MissingField {
                record: 1,
                attribute: CREATED_AT.to_string()
            }
        );

        let wrong_type =
            RecordSet::new(vec![Record::new().with(CREATED_AT, Value::Utf8("soon".into()))]);
        assert!(matches!(
            timestamp_range(&wrong_type).unwrap_err(),
            QueryError::WrongType { record: 0, .. }
        ));
    }

    #[test]
    fn bucket_index_boundaries() {
        // interval = (199 - 0 + 1) / 200 = 1.0
        assert_eq!(bucket_index(0, 0, 199, 200), 0);
        assert_eq!(bucket_index(1, 0, 199, 200), 1);
        assert_eq!(bucket_index(199, 0, 199, 200), 199);
    }

    #[test]
    fn bucket_index_huge_range_can_hit_bucket_count() {
        // 25 * 2^49 + 1 is not representable in f64, so the interval rounds down to exactly
        // 2^46 and the last timestamp divides to 200.0, the documented edge index.
        let max = 25i64 << 49;
        assert_eq!(bucket_index(max, 0, max, 200), 200);
        assert_eq!(bucket_index(0, 0, max, 200), 0);
    }

    #[test]
    fn count_per_bucket_covers_every_record() {
        let records = RecordSet::new(vec![
            submission(0, 1, ""),
            submission(25, 1, ""),
            submission(100, 1, ""),
            submission(199, 1, ""),
        ]);
        let buckets = count_per_bucket(&records).unwrap();
        assert_eq!(buckets.values().sum::<u64>(), records.record_count() as u64);
        assert_eq!(buckets[&0], 1);
        assert_eq!(buckets[&25], 1);
        assert_eq!(buckets[&100], 1);
        assert_eq!(buckets[&199], 1);
    }

    #[test]
    fn count_per_bucket_with_coarse_buckets() {
        let records = RecordSet::new(vec![
            submission(0, 1, ""),
            submission(1, 1, ""),
            submission(8, 1, ""),
            submission(9, 1, ""),
        ]);
        // interval = 10 / 2 = 5.0
        let buckets = count_per_bucket_with(&records, 2).unwrap();
        assert_eq!(buckets[&0], 2);
        assert_eq!(buckets[&1], 2);
    }

    #[test]
    fn hour_of_timestamp_is_utc_hour() {
        assert_eq!(hour_of_timestamp(0).unwrap(), 0);
        assert_eq!(hour_of_timestamp(3600).unwrap(), 1);
        assert_eq!(hour_of_timestamp(86_399).unwrap(), 23);
        assert_eq!(hour_of_timestamp(86_400).unwrap(), 0);
        // 1969-12-31T23:59:59Z
        assert_eq!(hour_of_timestamp(-1).unwrap(), 23);
        assert_eq!(
            hour_of_timestamp(i64::MAX).unwrap_err(),
            QueryError::TimestampOutOfRange { seconds: i64::MAX }
        );
    }

    #[test]
    fn average_points_per_hour_is_the_mean() {
        let records = RecordSet::new(vec![
            submission(10, 100, ""),
            submission(20, 200, ""),
            submission(3600, 50, ""),
        ]);
        let averages = average_points_per_hour(&records).unwrap();
        assert_eq!(averages[&0], 150.0);
        assert_eq!(averages[&1], 50.0);
    }

    #[test]
    fn average_points_requires_points() {
        let records = RecordSet::new(vec![Record::new().with(CREATED_AT, Value::Int64(0))]);
        assert_eq!(
            average_points_per_hour(&records).unwrap_err(),
            QueryError::MissingField {
                record: 0,
                attribute: POINTS.to_string()
            }
        );
    }

    #[test]
    fn success_threshold_is_strict() {
        let records = RecordSet::new(vec![
            submission(0, 200, ""),
            submission(10, 201, ""),
        ]);
        let proportions = success_proportion_per_hour(&records, 200.0).unwrap();
        assert_eq!(proportions[&0], 0.5);
    }

    #[test]
    fn title_word_count_matches_word_runs() {
        let titled = |title: &str| submission(0, 1, title);
        assert_eq!(title_word_count(&titled("a b")), 2);
        assert_eq!(title_word_count(&titled("")), 0);
        assert_eq!(title_word_count(&titled("Hello, World!")), 2);
        assert_eq!(title_word_count(&titled("foo_bar baz2")), 2);
        assert_eq!(title_word_count(&titled("héllo wörld")), 2);
        // no title attribute counts as zero
        assert_eq!(title_word_count(&Record::new()), 0);
        // non-string title treated like an absent one
        assert_eq!(
            title_word_count(&Record::new().with(TITLE, Value::Int64(42))),
            0
        );
    }

    #[test]
    fn title_length_distribution_includes_titleless_records() {
        let records = RecordSet::new(vec![
            submission(0, 1, "one two three"),
            submission(1, 1, "one two"),
            submission(2, 1, "four five"),
            Record::new().with(CREATED_AT, Value::Int64(3)).with(POINTS, Value::Int64(1)),
        ]);
        let lengths = count_per_title_length(&records);
        assert_eq!(lengths[&3], 1);
        assert_eq!(lengths[&2], 2);
        assert_eq!(lengths[&0], 1);
        assert_eq!(lengths.values().sum::<u64>(), records.record_count() as u64);
    }

    #[test]
    fn success_proportion_per_title_length_groups_by_word_count() {
        let records = RecordSet::new(vec![
            submission(0, 300, "a b"),
            submission(1, 100, "c d"),
            submission(2, 500, "e"),
        ]);
        let proportions = success_proportion_per_title_length(&records, 200.0).unwrap();
        assert_eq!(proportions[&2], 0.5);
        assert_eq!(proportions[&1], 1.0);
    }

    #[test]
    fn worked_example() {
        let records = RecordSet::new(vec![
            submission(0, 300, "a b"),
            submission(3600, 100, ""),
        ]);

        let per_hour = count_per_hour(&records).unwrap();
        assert_eq!(per_hour.len(), 2);
        assert_eq!(per_hour[&0], 1);
        assert_eq!(per_hour[&1], 1);

        let successful =
            success_proportion_per_hour(&records, DEFAULT_SUCCESS_THRESHOLD).unwrap();
        assert_eq!(successful[&0], 1.0);
        assert_eq!(successful[&1], 0.0);

        let lengths = count_per_title_length(&records);
        assert_eq!(lengths.len(), 2);
        assert_eq!(lengths[&2], 1);
        assert_eq!(lengths[&0], 1);
    }

    #[test]
    fn aggregations_are_idempotent() {
        let records = RecordSet::new(vec![
            submission(0, 300, "a b"),
            submission(90, 100, "c"),
            submission(3600, 250, "d e f"),
        ]);
        assert_eq!(
            count_per_hour(&records).unwrap(),
            count_per_hour(&records).unwrap()
        );
        assert_eq!(
            count_per_bucket(&records).unwrap(),
            count_per_bucket(&records).unwrap()
        );
        assert_eq!(
            average_points_per_hour(&records).unwrap(),
            average_points_per_hour(&records).unwrap()
        );
    }
}
