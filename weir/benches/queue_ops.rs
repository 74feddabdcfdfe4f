//! Benchmarks for completion-queue operations using criterion.
//!
//! These benchmarks measure:
//! - Uncontended put/take round trips
//! - Put/take throughput with a pool of producers and consumers
//! - A small end-to-end workload run

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use tokio::runtime::Runtime;
use weir::{CompletionQueue, ConsumerSpec, WorkloadConfig, WorkloadLimits, WorkloadRuntime};
use weir_testkit::{CountingItemConsumer, RangeProducer};

/// Creates a tokio runtime for async benchmarks.
fn create_runtime() -> Runtime {
    Runtime::new().expect("Failed to create tokio runtime")
}

/// Benchmark: single-task put/take round trip.
fn bench_put_take_round_trip(c: &mut Criterion) {
    let rt = create_runtime();

    let mut group = c.benchmark_group("put_take_round_trip");
    group.sample_size(100);

    group.bench_function("capacity_16", |b| {
        let queue = Arc::new(CompletionQueue::new(16));
        b.to_async(&rt).iter(|| {
            let queue = Arc::clone(&queue);
            async move {
                queue.put(1u64).await;
                queue.take().await
            }
        });
    });

    group.finish();
}

/// Benchmark: contended throughput, four producers against four consumers.
fn bench_contended_throughput(c: &mut Criterion) {
    let rt = create_runtime();
    const ITEMS_PER_PRODUCER: u64 = 250;

    let mut group = c.benchmark_group("contended_throughput");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));
    group.throughput(Throughput::Elements(4 * ITEMS_PER_PRODUCER));

    group.bench_function("4p_4c_capacity_16", |b| {
        b.to_async(&rt).iter(|| async {
            let queue = Arc::new(CompletionQueue::new(16));

            let mut producers = Vec::new();
            for _ in 0..4 {
                let q = Arc::clone(&queue);
                producers.push(tokio::spawn(async move {
                    for i in 0..ITEMS_PER_PRODUCER {
                        q.put(i).await;
                    }
                }));
            }

            let mut consumers = Vec::new();
            for _ in 0..4 {
                let q = Arc::clone(&queue);
                consumers.push(tokio::spawn(async move {
                    let mut taken = 0u64;
                    while q.take().await.is_some() {
                        taken += 1;
                    }
                    taken
                }));
            }

            for handle in producers {
                handle.await.expect("producer should not panic");
            }
            queue.complete();

            let mut total = 0u64;
            for handle in consumers {
                total += handle.await.expect("consumer should not panic");
            }
            total
        });
    });

    group.finish();
}

/// Benchmark: end-to-end run through the full runtime.
fn bench_end_to_end_run(c: &mut Criterion) {
    let rt = create_runtime();

    let mut group = c.benchmark_group("end_to_end_run");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(15));
    group.throughput(Throughput::Elements(500));

    group.bench_function("1p_4c_500_items", |b| {
        b.to_async(&rt).iter(|| async {
            let config = WorkloadConfig::new(
                RangeProducer::new(500),
                ConsumerSpec::item(CountingItemConsumer::new()),
                WorkloadLimits::default()
                    .with_buffer_capacity(32)
                    .with_consumer_count(4),
            )
            .expect("valid config");

            WorkloadRuntime::new(config)
                .run()
                .await
                .expect("run should succeed")
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_put_take_round_trip,
    bench_contended_throughput,
    bench_end_to_end_run
);
criterion_main!(benches);
