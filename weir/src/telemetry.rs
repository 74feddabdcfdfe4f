//! Tracing and telemetry instrumentation for weir.
//!
//! This module provides helper functions for creating tracing spans and
//! recording run lifecycle events. All functions work both with and without
//! the `metrics` feature flag.
//!
//! # Spans
//!
//! - `weir.workload` - one per run, carrying the run id
//! - `weir.producer` / `weir.consumer` - one per worker task

use tracing::{info_span, Span};

use crate::config::WorkloadLimits;
use crate::runtime::{RunId, WorkloadStats};

/// Create the tracing span covering one workload run.
#[must_use]
pub fn workload_span(run_id: RunId) -> Span {
    info_span!("weir.workload", run_id = %run_id)
}

/// Create the tracing span for one producer worker task.
#[must_use]
pub fn producer_span(run_id: RunId, worker_id: &str) -> Span {
    info_span!(
        "weir.producer",
        run_id = %run_id,
        worker_id = %worker_id,
    )
}

/// Create the tracing span for one consumer worker task.
#[must_use]
pub fn consumer_span(run_id: RunId, worker_id: &str) -> Span {
    info_span!(
        "weir.consumer",
        run_id = %run_id,
        worker_id = %worker_id,
    )
}

/// Record the start of a workload run.
pub fn record_workload_started(run_id: RunId, limits: &WorkloadLimits, consumer_shape: &str) {
    tracing::info!(
        run_id = %run_id,
        producers = limits.producer_count,
        consumers = limits.consumer_count,
        buffer_capacity = limits.buffer_capacity,
        consumer_shape = %consumer_shape,
        "workload started"
    );
}

/// Record the completion of a workload run.
///
/// `outcome` is `success` or `failed`. The event is logged via tracing and,
/// when the `metrics` feature is enabled, forwarded to the Prometheus
/// counters and histograms.
pub fn record_workload_completed(run_id: RunId, outcome: &str, stats: &WorkloadStats) {
    tracing::info!(
        run_id = %run_id,
        outcome = %outcome,
        items_produced = stats.items_produced,
        items_consumed = stats.items_consumed,
        elapsed_ms = stats.elapsed().num_milliseconds(),
        "workload completed"
    );

    #[cfg(feature = "metrics")]
    {
        crate::metrics::record_workload_completed(outcome);
        crate::metrics::add_items_produced(stats.items_produced);
        crate::metrics::add_items_consumed(stats.items_consumed);
        crate::metrics::observe_workload_duration(
            outcome,
            stats.elapsed().num_milliseconds() as f64 / 1000.0,
        );
    }
}
