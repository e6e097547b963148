//! Execution engine for running processing pipelines with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) execution for filter/map and key-grouped reduce
//! - Resource limits / throttling (e.g., in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring
//!
//! Parallel keyed reduction builds one partial map per chunk and merges the partials with the
//! caller's combiner. Combiners are required to be associative and commutative, so the merged
//! result is identical to a sequential [`crate::processing::reduce_by_key`] run regardless of
//! chunking or execution order.

mod observer;
mod throttle;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::QueryResult;
use crate::types::{Record, RecordSet};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use throttle::Throttle;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of records per chunk.
    ///
    /// Chunking lets the engine bound working-set size and implement throttling.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n.max(1),
        }
    }
}

/// A configurable execution engine for in-memory [`RecordSet`] pipelines.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size == 0`, `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> Self {
        assert!(opts.chunk_size > 0, "chunk_size must be > 0");
        assert!(
            opts.max_in_flight_chunks > 0,
            "max_in_flight_chunks must be > 0"
        );
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            opts: opts.clone(),
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Execute a parallel filter over the collection.
    pub fn filter_parallel<F>(&self, records: &RecordSet, predicate: F) -> RecordSet
    where
        F: Fn(&Record) -> bool + Send + Sync,
    {
        self.pool.install(|| self.filter_parallel_impl(records, &predicate))
    }

    fn filter_parallel_impl(
        &self,
        records: &RecordSet,
        predicate: &(dyn Fn(&Record) -> bool + Send + Sync),
    ) -> RecordSet {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let throttle = Throttle::new(self.opts.max_in_flight_chunks);
        let chunk_ranges = chunk_ranges(records.record_count(), self.opts.chunk_size);

        let per_chunk: Vec<Vec<Record>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                throttle.run(|waited| {
                    self.note_wait(waited);
                    self.metrics.on_chunk_start();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start_record: range.start,
                        record_count: range.end - range.start,
                    });

                    let mut out = Vec::new();
                    for record in &records.records[range] {
                        self.metrics.on_record_processed();
                        if predicate(record) {
                            out.push(record.clone());
                        }
                    }

                    self.emit(ExecutionEvent::ChunkFinished {
                        output_records: out.len(),
                    });
                    self.metrics.on_chunk_end();
                    out
                })
            })
            .collect();

        let out = RecordSet::new(per_chunk.into_iter().flatten().collect());

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        out
    }

    /// Execute a parallel map over the collection.
    pub fn map_parallel<F>(&self, records: &RecordSet, mapper: F) -> RecordSet
    where
        F: Fn(&Record) -> Record + Send + Sync,
    {
        self.pool.install(|| self.map_parallel_impl(records, &mapper))
    }

    fn map_parallel_impl(
        &self,
        records: &RecordSet,
        mapper: &(dyn Fn(&Record) -> Record + Send + Sync),
    ) -> RecordSet {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let throttle = Throttle::new(self.opts.max_in_flight_chunks);
        let chunk_ranges = chunk_ranges(records.record_count(), self.opts.chunk_size);

        let per_chunk: Vec<Vec<Record>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                throttle.run(|waited| {
                    self.note_wait(waited);
                    self.metrics.on_chunk_start();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start_record: range.start,
                        record_count: range.end - range.start,
                    });

                    let mut out = Vec::with_capacity(range.end - range.start);
                    for record in &records.records[range] {
                        self.metrics.on_record_processed();
                        out.push(mapper(record));
                    }

                    self.emit(ExecutionEvent::ChunkFinished {
                        output_records: out.len(),
                    });
                    self.metrics.on_chunk_end();
                    out
                })
            })
            .collect();

        let out = RecordSet::new(per_chunk.into_iter().flatten().collect());

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        out
    }

    /// Execute a parallel key-grouped reduce over the collection.
    ///
    /// Each chunk produces an ordered partial map; the partials are merged with `merge` after
    /// all chunks finish. Because `merge` must be associative and commutative, the result is
    /// identical to [`crate::processing::reduce_by_key`] for any chunk size.
    ///
    /// `key_of`/`value_of` failures abort the run: the first error (in record order within its
    /// chunk) is surfaced unmodified and no partial result is returned.
    pub fn reduce_by_key_parallel<K, V, KF, VF, MF>(
        &self,
        records: &RecordSet,
        key_of: KF,
        value_of: VF,
        merge: MF,
    ) -> QueryResult<BTreeMap<K, V>>
    where
        K: Ord + Send,
        V: Send,
        KF: Fn(usize, &Record) -> QueryResult<K> + Send + Sync,
        VF: Fn(usize, &Record) -> QueryResult<V> + Send + Sync,
        MF: Fn(&mut V, V) + Send + Sync,
    {
        self.pool
            .install(|| self.reduce_by_key_parallel_impl(records, &key_of, &value_of, &merge))
    }

    fn reduce_by_key_parallel_impl<K, V>(
        &self,
        records: &RecordSet,
        key_of: &(dyn Fn(usize, &Record) -> QueryResult<K> + Send + Sync),
        value_of: &(dyn Fn(usize, &Record) -> QueryResult<V> + Send + Sync),
        merge: &(dyn Fn(&mut V, V) + Send + Sync),
    ) -> QueryResult<BTreeMap<K, V>>
    where
        K: Ord + Send,
        V: Send,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let throttle = Throttle::new(self.opts.max_in_flight_chunks);
        let chunk_ranges = chunk_ranges(records.record_count(), self.opts.chunk_size);

        let partials: QueryResult<Vec<BTreeMap<K, V>>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                throttle.run(|waited| {
                    self.note_wait(waited);
                    self.metrics.on_chunk_start();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start_record: range.start,
                        record_count: range.end - range.start,
                    });

                    let base = range.start;
                    let mut partial: BTreeMap<K, V> = BTreeMap::new();
                    let status = records.records[range]
                        .iter()
                        .enumerate()
                        .try_for_each(|(offset, record)| {
                            self.metrics.on_record_processed();
                            let key = key_of(base + offset, record)?;
                            let value = value_of(base + offset, record)?;
                            match partial.entry(key) {
                                Entry::Vacant(slot) => {
                                    slot.insert(value);
                                }
                                Entry::Occupied(mut slot) => merge(slot.get_mut(), value),
                            }
                            Ok(())
                        });

                    self.emit(ExecutionEvent::ChunkFinished {
                        output_records: partial.len(),
                    });
                    self.metrics.on_chunk_end();
                    status.map(|()| partial)
                })
            })
            .collect();

        let result = partials.map(|partials| {
            self.emit(ExecutionEvent::MergeStarted {
                partial_maps: partials.len(),
            });

            let mut merged: BTreeMap<K, V> = BTreeMap::new();
            for partial in partials {
                for (key, value) in partial {
                    match merged.entry(key) {
                        Entry::Vacant(slot) => {
                            slot.insert(value);
                        }
                        Entry::Occupied(mut slot) => merge(slot.get_mut(), value),
                    }
                }
            }

            self.metrics.on_groups_merged(merged.len());
            self.emit(ExecutionEvent::MergeFinished {
                groups: merged.len(),
            });
            merged
        });

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        result
    }

    fn note_wait(&self, waited: Duration) {
        if waited > Duration::ZERO {
            self.metrics.on_throttle_wait(waited);
            self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
        }
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(record_count: usize, chunk_size: usize) -> Vec<std::ops::Range<usize>> {
    if record_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(record_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < record_count {
        let end = (start + chunk_size).min(record_count);
        out.push(start..end);
        start = end;
    }
    out
}
