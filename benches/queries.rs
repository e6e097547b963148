use criterion::{black_box, criterion_group, criterion_main, Criterion};

use submission_analytics::analytics::{count_per_bucket, count_per_hour, success_proportion_per_hour};
use submission_analytics::execution::{ExecutionEngine, ExecutionOptions};
use submission_analytics::types::{Record, RecordSet, Value};

fn synthetic_submissions(count: usize) -> RecordSet {
    let titles = [
        "show hn a thing i made",
        "ask hn",
        "rust analytics engine",
        "",
        "a b c d e f g",
    ];
    (0..count as i64)
        .map(|i| {
            Record::new()
                .with("created_at_i", Value::Int64((i * 97) % 2_592_000))
                .with("points", Value::Int64(i % 500))
                .with(
                    "title",
                    Value::Utf8(titles[i as usize % titles.len()].to_string()),
                )
        })
        .collect()
}

fn bench_queries(c: &mut Criterion) {
    let records = synthetic_submissions(50_000);

    c.bench_function("count_per_hour_50k", |b| {
        b.iter(|| count_per_hour(black_box(&records)).unwrap())
    });

    c.bench_function("count_per_bucket_50k", |b| {
        b.iter(|| count_per_bucket(black_box(&records)).unwrap())
    });

    c.bench_function("success_proportion_per_hour_50k", |b| {
        b.iter(|| success_proportion_per_hour(black_box(&records), 200.0).unwrap())
    });
}

fn bench_parallel_reduce(c: &mut Criterion) {
    let records = synthetic_submissions(200_000);
    let engine = ExecutionEngine::new(ExecutionOptions::default());

    c.bench_function("parallel_hour_count_200k", |b| {
        b.iter(|| {
            engine
                .reduce_by_key_parallel(
                    black_box(&records),
                    |_, r| {
                        submission_analytics::analytics::hour_of_timestamp(
                            r.int("created_at_i").unwrap(),
                        )
                    },
                    |_, _| Ok(1u64),
                    |count, one| *count += one,
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_queries, bench_parallel_reduce);
criterion_main!(benches);
