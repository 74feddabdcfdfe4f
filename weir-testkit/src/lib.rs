//! Test producers and consumers for the weir workload runtime.
//!
//! These helpers cover the common shapes exercised by weir's unit,
//! integration, and benchmark code: producers that emit a fixed range of
//! items (optionally slowly, optionally failing part-way), and consumers
//! that count or collect what they see. Item type is fixed to `u64` to keep
//! call sites terse.

/// Producers emitting fixed item ranges, with optional delays and failures.
pub mod producers;

/// Consumers that count or collect the items they observe.
pub mod consumers;

pub use consumers::{CollectingItemConsumer, CountingItemConsumer, CountingQueueConsumer};
pub use producers::{FailingProducer, RangeProducer};
