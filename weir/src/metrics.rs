//! Prometheus metrics instrumentation for weir.
//!
//! This module provides Prometheus metrics for monitoring workload runs.
//! All metrics are conditionally compiled behind the `metrics` feature flag.
//!
//! # Metrics
//!
//! ## Counters
//! - `weir_workloads_total` - Total workload runs, labelled by outcome
//! - `weir_items_produced_total` - Total items enqueued across all runs
//! - `weir_items_consumed_total` - Total items dequeued across all runs
//!
//! ## Histograms
//! - `weir_workload_duration_seconds` - Run duration in seconds, by outcome
#![cfg(feature = "metrics")]

use prometheus::{exponential_buckets, CounterVec, HistogramVec, IntCounter, Opts, Registry};
use std::sync::LazyLock;

/// Global Prometheus registry for weir metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Counter for completed workload runs.
///
/// Labels:
/// - `outcome`: `success` or `failed`
pub static WORKLOADS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new("weir_workloads_total", "Total number of workload runs");
    CounterVec::new(opts, &["outcome"]).expect("weir_workloads_total metric creation failed")
});

/// Counter for items enqueued across all runs.
pub static ITEMS_PRODUCED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "weir_items_produced_total",
        "Total number of items enqueued",
    )
    .expect("weir_items_produced_total metric creation failed")
});

/// Counter for items dequeued across all runs.
pub static ITEMS_CONSUMED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "weir_items_consumed_total",
        "Total number of items dequeued",
    )
    .expect("weir_items_consumed_total metric creation failed")
});

/// Histogram for workload run duration in seconds.
///
/// Labels:
/// - `outcome`: `success` or `failed`
pub static WORKLOAD_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let buckets = exponential_buckets(0.001, 2.0, 15).expect("bucket creation failed");
    let opts = prometheus::HistogramOpts::new(
        "weir_workload_duration_seconds",
        "Workload run duration in seconds",
    )
    .buckets(buckets);
    HistogramVec::new(opts, &["outcome"])
        .expect("weir_workload_duration_seconds metric creation failed")
});

/// Initialize all metrics by registering them with the global registry.
///
/// This function is idempotent - calling it multiple times is safe.
pub fn init_metrics() -> anyhow::Result<()> {
    let registry = &*REGISTRY;

    for metric in [
        Box::new(WORKLOADS_TOTAL.clone()) as Box<dyn prometheus::core::Collector>,
        Box::new(ITEMS_PRODUCED_TOTAL.clone()),
        Box::new(ITEMS_CONSUMED_TOTAL.clone()),
        Box::new(WORKLOAD_DURATION_SECONDS.clone()),
    ] {
        if let Err(e) = registry.register(metric) {
            let msg = e.to_string();
            if !msg.contains("Duplicate metrics collector registration attempted") {
                return Err(e.into());
            }
        }
    }

    Ok(())
}

/// Helper to record a completed workload run.
pub fn record_workload_completed(outcome: &str) {
    WORKLOADS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Helper to add to the produced-items counter.
pub fn add_items_produced(count: u64) {
    ITEMS_PRODUCED_TOTAL.inc_by(count);
}

/// Helper to add to the consumed-items counter.
pub fn add_items_consumed(count: u64) {
    ITEMS_CONSUMED_TOTAL.inc_by(count);
}

/// Helper to observe a workload run duration.
pub fn observe_workload_duration(outcome: &str, duration_secs: f64) {
    WORKLOAD_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration_secs);
}

/// Gather all registered metrics in Prometheus text format.
pub fn gather_metrics() -> anyhow::Result<String> {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder
        .encode_to_string(&metric_families)
        .map_err(Into::into)
}
