//! Reduction operations for [`crate::types::RecordSet`].
//!
//! Two shapes of reduction are provided:
//!
//! - [`fold()`]: collapse the whole collection into one accumulator
//! - [`count_by_key()`] / [`reduce_by_key()`]: group records by a derived key and combine a
//!   per-record value into one accumulator per group
//!
//! Grouped results are returned as `BTreeMap`s so that re-running an aggregation over the same
//! collection yields bit-identical output.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::QueryResult;
use crate::types::{Record, RecordSet};

/// Reduce (fold) all records into an accumulator value.
///
/// This is a convenience wrapper around [`RecordSet::reduce_records`].
pub fn fold<A, F>(records: &RecordSet, init: A, reducer: F) -> A
where
    F: FnMut(A, &Record) -> A,
{
    records.reduce_records(init, reducer)
}

/// Count records per derived key.
///
/// Every record contributes to exactly one group, so the counts sum to the record count.
pub fn count_by_key<K, F>(records: &RecordSet, mut key_of: F) -> BTreeMap<K, u64>
where
    K: Ord,
    F: FnMut(&Record) -> K,
{
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key_of(record)).or_insert(0) += 1;
    }
    counts
}

/// Group records by a derived key and combine per-record values into one accumulator per group.
///
/// `key_of` and `value_of` receive the record's position in the collection (used in error
/// reporting) and may fail; the first error aborts the whole reduction and no partial result is
/// returned. A group's accumulator is created from the first record that maps to it and merged
/// with `merge` on every collision, so an accumulator always covers at least one record.
///
/// `merge` must be associative and commutative for the grouped result to be independent of
/// execution order; [`crate::execution::ExecutionEngine::reduce_by_key_parallel`] relies on this.
pub fn reduce_by_key<K, V, KF, VF, MF>(
    records: &RecordSet,
    mut key_of: KF,
    mut value_of: VF,
    mut merge: MF,
) -> QueryResult<BTreeMap<K, V>>
where
    K: Ord,
    KF: FnMut(usize, &Record) -> QueryResult<K>,
    VF: FnMut(usize, &Record) -> QueryResult<V>,
    MF: FnMut(&mut V, V),
{
    let mut groups = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        let key = key_of(index, record)?;
        let value = value_of(index, record)?;
        match groups.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => merge(slot.get_mut(), value),
        }
    }
    Ok(groups)
}

/// A (sum, count) pair combined during grouped reduction, consumed once via [`Self::mean`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeanAccumulator {
    /// Running sum of observed values.
    pub sum: f64,
    /// Number of observed values.
    pub count: u64,
}

impl MeanAccumulator {
    /// Accumulator covering a single observation.
    pub fn of(value: f64) -> Self {
        Self {
            sum: value,
            count: 1,
        }
    }

    /// Combine another accumulator into this one. Associative and commutative.
    pub fn merge(&mut self, other: Self) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Arithmetic mean of the observed values.
    ///
    /// Grouped reduction only creates an accumulator once a record maps to the group, so
    /// `count >= 1` and the division is safe.
    pub fn mean(&self) -> f64 {
        debug_assert!(self.count > 0, "accumulator covers at least one record");
        self.sum / self.count as f64
    }
}

/// A (hit-count, count) pair combined during grouped reduction, consumed once via
/// [`Self::proportion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProportionAccumulator {
    /// Number of observations satisfying the predicate.
    pub hits: u64,
    /// Total number of observations.
    pub count: u64,
}

impl ProportionAccumulator {
    /// Accumulator covering a single observation.
    pub fn of(hit: bool) -> Self {
        Self {
            hits: hit as u64,
            count: 1,
        }
    }

    /// Combine another accumulator into this one. Associative and commutative.
    pub fn merge(&mut self, other: Self) {
        self.hits += other.hits;
        self.count += other.count;
    }

    /// Fraction of observations satisfying the predicate, in `[0.0, 1.0]`.
    ///
    /// `count >= 1` for the same reason as [`MeanAccumulator::mean`].
    pub fn proportion(&self) -> f64 {
        debug_assert!(self.count > 0, "accumulator covers at least one record");
        self.hits as f64 / self.count as f64
    }
}
