//! Weir - bounded fan-out/fan-in workload coordination on tokio.
//!
//! A foundational crate for running N producer tasks against M consumer tasks
//! over a single shared, capacity-bounded queue, with well-defined completion
//! and failure semantics.
//!
//! # Core Concepts
//!
//! - **Queue**: the [`CompletionQueue`] is a bounded FIFO augmented with a
//!   monotonic completion flag and a first-wins failure cause. Producers see
//!   it through a [`ProducerHandle`] (`put` / `complete` / `fail`), consumers
//!   through a [`ConsumerHandle`] (`completed` / `take` / `poll`).
//!
//! - **Tasks**: callers supply work as implementations of the [`Producer`]
//!   trait and one of the two consumer shapes, [`QueueConsumer`] (drive your
//!   own poll loop) or [`ItemConsumer`] (the runtime's default loop feeds you
//!   one item at a time). The shape is fixed at configuration time by
//!   [`ConsumerSpec`].
//!
//! - **Configuration**: [`WorkloadConfig`] validates buffer capacity, task
//!   counts, and shutdown timeouts up front and is immutable afterwards.
//!
//! - **Runtime**: [`WorkloadRuntime`] spawns both worker pools, waits for
//!   every producer to reach a terminal state, finalizes the queue exactly
//!   once (complete, or fail with the first producer error), waits for the
//!   consumers to drain, shuts both pools down within their configured grace
//!   periods, and only then delivers the outcome.
//!
//! Producer failures become the run's outcome; consumer failures are isolated
//! to their task. Either way the queue ends drained-and-complete before the
//! caller observes anything.
//!
//! # Feature Flags
//!
//! - `metrics` - Prometheus metrics support
//!
//! # Example
//!
//! ```ignore
//! use weir::*;
//!
//! struct Pager;
//!
//! #[async_trait::async_trait]
//! impl Producer<u64> for Pager {
//!     async fn produce(&self, queue: ProducerHandle<u64>) -> anyhow::Result<()> {
//!         for page in fetch_pages().await? {
//!             for item in page {
//!                 queue.put(item).await;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let config = WorkloadConfig::new(
//!     Pager,
//!     ConsumerSpec::item(StoreItem::new()),
//!     WorkloadLimits::default()
//!         .with_buffer_capacity(10)
//!         .with_consumer_count(10),
//! )?;
//! let stats = WorkloadRuntime::new(config).run().await?;
//! ```

/// Workload configuration and validation.
///
/// The `config` module defines [`WorkloadLimits`], the validating
/// [`WorkloadConfig`] constructor, and [`ConfigError`]. Invalid counts and
/// capacities are rejected at construction time, never at run time.
pub mod config;

/// The bounded completion queue.
///
/// The `queue` module defines [`CompletionQueue`] and the two narrowing views
/// handed to caller-supplied tasks, [`ProducerHandle`] and
/// [`ConsumerHandle`].
pub mod queue;

/// Caller-supplied task traits.
///
/// The `task` module defines the [`Producer`], [`QueueConsumer`], and
/// [`ItemConsumer`] seams and the [`ConsumerSpec`] shape selector.
pub mod task;

/// Runtime orchestration and worker management.
///
/// The `runtime` module provides the [`WorkloadRuntime`] that sequences a
/// run: spawn pools, join producers, finalize the queue, join consumers,
/// bounded-time shutdown, result delivery. Includes [`RunId`],
/// [`WorkloadStats`], and [`WorkloadError`].
pub mod runtime;

/// Tracing spans and lifecycle event recording.
pub mod telemetry;

/// Prometheus metrics, available behind the `metrics` feature.
pub mod metrics;

pub use config::*;
pub use queue::*;
pub use runtime::{RunId, WorkloadError, WorkloadRuntime, WorkloadStats};
pub use task::*;
