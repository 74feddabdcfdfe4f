use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::WorkloadConfig;
use crate::queue::CompletionQueue;
use crate::runtime::worker::{self, WorkerPool};
use crate::telemetry;

/// Unique identifier for one workload run, used in spans and the run report.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error delivered as a workload run's outcome.
///
/// Only producer failures reach the caller this way; consumer errors are
/// isolated to their tasks and shutdown timeouts are handled by forced
/// termination without surfacing here.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// A producer task terminated with an uncaught error; the cause recorded
    /// on the queue is carried here. Consumers still drained the queue to
    /// empty-and-complete before this was delivered.
    #[error("producer task failed: {0:#}")]
    ProducerFailed(anyhow::Error),
}

impl WorkloadError {
    /// The underlying failure cause.
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            Self::ProducerFailed(cause) => cause,
        }
    }
}

/// Summary of a finished run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkloadStats {
    /// The run this report describes.
    pub run_id: RunId,
    /// Total items enqueued by all producers combined.
    pub items_produced: u64,
    /// Total items dequeued by all consumers combined.
    pub items_consumed: u64,
    /// Timestamp when the run started.
    pub started_at: DateTime<Utc>,
    /// Timestamp when the run finished, after pool shutdown.
    pub finished_at: DateTime<Utc>,
}

impl WorkloadStats {
    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Orchestrates one fan-out/fan-in run over a shared [`CompletionQueue`].
///
/// The runtime owns the queue for the lifetime of the run and sequences it
/// through:
///
/// 1. spawn `producer_count` producer workers and `consumer_count` consumer
///    workers (consumers start consuming immediately; only the completion
///    signal is deferred);
/// 2. join barrier over all producers;
/// 3. finalize the queue exactly once: `fail` with the first observed
///    producer error, or `complete`;
/// 4. join barrier over all consumers (their errors are isolated);
/// 5. unconditional bounded-time shutdown of both pools;
/// 6. deliver the outcome: the run report, or the recorded failure cause.
pub struct WorkloadRuntime<T> {
    config: WorkloadConfig<T>,
    run_id: RunId,
}

impl<T> fmt::Debug for WorkloadRuntime<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkloadRuntime")
            .field("run_id", &self.run_id)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Send + 'static> WorkloadRuntime<T> {
    /// Create a runtime for one run of the given workload.
    pub fn new(config: WorkloadConfig<T>) -> Self {
        Self {
            config,
            run_id: RunId::new(),
        }
    }

    /// The identifier assigned to this run.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The workload configuration this runtime was built from.
    pub fn config(&self) -> &WorkloadConfig<T> {
        &self.config
    }

    /// Execute the workload to completion and deliver its outcome.
    ///
    /// Shutdown always runs before the outcome is observable, on success and
    /// failure alike, so a failed run still leaves the queue drained to
    /// empty-and-complete by the consumers that were running.
    pub async fn run(self) -> Result<WorkloadStats, WorkloadError> {
        let span = telemetry::workload_span(self.run_id);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) -> Result<WorkloadStats, WorkloadError> {
        let started_at = Utc::now();
        let limits = self.config.limits().clone();
        let queue = Arc::new(CompletionQueue::new(limits.buffer_capacity));
        telemetry::record_workload_started(self.run_id, &limits, self.config.consumer().shape());

        let producer = self.config.producer();
        let mut producer_pool = WorkerPool::new("producer");
        for i in 0..limits.producer_count {
            let worker_id = format!("producer-w{i}");
            let span = telemetry::producer_span(self.run_id, &worker_id);
            producer_pool.spawn(
                worker::run_producer(worker_id, Arc::clone(&producer), Arc::clone(&queue))
                    .instrument(span),
            );
        }

        let consumer = self.config.consumer();
        let mut consumer_pool = WorkerPool::new("consumer");
        for i in 0..limits.consumer_count {
            let worker_id = format!("consumer-w{i}");
            let span = telemetry::consumer_span(self.run_id, &worker_id);
            consumer_pool.spawn(
                worker::run_consumer(worker_id, consumer.clone(), Arc::clone(&queue))
                    .instrument(span),
            );
        }

        tracing::debug!(
            run_id = %self.run_id,
            producers = producer_pool.len(),
            consumers = consumer_pool.len(),
            "worker pools spawned"
        );

        // Barrier: every producer reaches a terminal state before the queue
        // is finalized. Exactly one of fail/complete happens per run here.
        match producer_pool.join_all().await {
            Some(cause) => queue.fail(cause),
            None => queue.complete(),
        }

        // Barrier: consumers drain whatever is buffered and exit. Their
        // errors were logged by the workers and are dropped here.
        consumer_pool.join_all().await;

        // Unconditional bounded-time shutdown before the caller can observe
        // the outcome.
        producer_pool.shutdown(limits.producer_shutdown_timeout).await;
        consumer_pool.shutdown(limits.consumer_shutdown_timeout).await;

        let stats = WorkloadStats {
            run_id: self.run_id,
            items_produced: queue.items_produced(),
            items_consumed: queue.items_consumed(),
            started_at,
            finished_at: Utc::now(),
        };

        match queue.take_failure() {
            Some(cause) => {
                telemetry::record_workload_completed(self.run_id, "failed", &stats);
                Err(WorkloadError::ProducerFailed(cause))
            }
            None => {
                telemetry::record_workload_completed(self.run_id, "success", &stats);
                Ok(stats)
            }
        }
    }
}
