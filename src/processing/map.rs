//! Record mapping for [`crate::types::RecordSet`].

use crate::types::{Record, RecordSet};

/// Returns a new [`RecordSet`] by applying `mapper` to every record.
///
/// This is a convenience wrapper around [`RecordSet::map_records`]. Records are schema-less, so
/// the mapper is free to add, drop, or rename attributes.
pub fn map<F>(records: &RecordSet, mapper: F) -> RecordSet
where
    F: FnMut(&Record) -> Record,
{
    records.map_records(mapper)
}
