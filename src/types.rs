//! Core data model types.
//!
//! This crate ingests supported formats into an in-memory [`RecordSet`]: an ordered sequence of
//! schema-less [`Record`]s, each a mapping from attribute name to a scalar [`Value`]. Attributes
//! vary per record; there is no fixed schema.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A single scalar value held by a [`Record`] attribute.
///
/// There is deliberately no null variant: a missing value is represented by the attribute being
/// absent from the record. JSON `null` members and empty CSV cells ingest as absent attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Returns the contained integer, if this value is an [`Value::Int64`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns this value as a float, widening integers.
    ///
    /// Both [`Value::Int64`] and [`Value::Float64`] are numeric for aggregation purposes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained string slice, if this value is a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the contained boolean, if this value is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// One structured item in a [`RecordSet`]: an ordered attribute-name → [`Value`] mapping.
///
/// Records are immutable once produced; transformations build new records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    /// Attribute storage, ordered by name.
    pub attributes: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, mainly for constructing records in tests and examples.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Integer attribute accessor; `None` if absent or not an [`Value::Int64`].
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Numeric attribute accessor with integer widening; `None` if absent or non-numeric.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// String attribute accessor; `None` if absent or not a [`Value::Utf8`].
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Iterate this record's attribute names in order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// The set of attribute names used by this record.
    ///
    /// Two records have the same shape iff their name sets are equal (set equality, not
    /// ordering- or count-sensitive).
    pub fn attribute_name_set(&self) -> BTreeSet<&str> {
        self.attribute_names().collect()
    }
}

/// In-memory ordered collection of [`Record`]s.
///
/// A record set is produced once and consumed by chained operations; operations never mutate the
/// source collection, each produces a new derived collection or a scalar/aggregate result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    /// Record storage in iteration order.
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Create a record set from records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records in the collection. 0 for an empty collection.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first record in iteration order, if any.
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Iterate records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Create a new record set containing only records that match `predicate`.
    pub fn filter_records<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        let records = self
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        Self { records }
    }

    /// Create a new record set by applying `mapper` to every record.
    pub fn map_records<F>(&self, mapper: F) -> Self
    where
        F: FnMut(&Record) -> Record,
    {
        let records = self.records.iter().map(mapper).collect();
        Self { records }
    }

    /// Reduce (fold) all records into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each record as `&Record`.
    pub fn reduce_records<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &Record) -> A,
    {
        self.records
            .iter()
            .fold(init, |acc, record| reducer(acc, record))
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
