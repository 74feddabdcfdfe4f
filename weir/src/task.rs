use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::queue::{ConsumerHandle, ProducerHandle};

/// A caller-supplied produce function.
///
/// Each producer worker invokes [`produce`](Self::produce) exactly once,
/// sharing the run's queue with every other worker. On success the
/// implementation should enqueue whatever it has and return `Ok(())`; with a
/// single producer it may additionally call [`ProducerHandle::complete`] once
/// its source is exhausted. Returning an error (or panicking) marks the
/// producer task as failed; the first such failure becomes the run's outcome
/// and finalizes the queue so consumers can drain and exit.
///
/// Implementations must not `put` after signalling completion; the queue
/// does not police this.
#[async_trait]
pub trait Producer<T>: Send + Sync {
    async fn produce(&self, queue: ProducerHandle<T>) -> anyhow::Result<()>;
}

/// A caller-supplied consume function that drives its own poll loop.
///
/// The implementation receives the raw consumer handle and must loop until
/// [`ConsumerHandle::completed`] is true, typically via
/// [`ConsumerHandle::poll`] with a short timeout. An error return is logged
/// and isolates only that consumer task; it never affects the run outcome or
/// the other consumers.
#[async_trait]
pub trait QueueConsumer<T>: Send + Sync {
    async fn consume(&self, queue: ConsumerHandle<T>) -> anyhow::Result<()>;
}

/// A caller-supplied single-item consume function.
///
/// The runtime drives the loop: it polls the queue on a fixed short interval
/// and hands each dequeued item to [`consume`](Self::consume), terminating
/// exactly when the queue is drained-and-complete. Errors are logged and
/// swallowed per item; the loop continues with the next item. Implementations
/// must not block indefinitely.
#[async_trait]
pub trait ItemConsumer<T>: Send + Sync {
    async fn consume(&self, item: T) -> anyhow::Result<()>;
}

/// The consumer shape chosen at configuration time.
///
/// Exactly one of the two shapes exists per workload; the runtime branches on
/// the variant once at start time to pick the execution strategy.
pub enum ConsumerSpec<T> {
    /// The caller drives the poll loop itself.
    Queue(Arc<dyn QueueConsumer<T>>),
    /// The runtime's default loop feeds the caller one item at a time.
    Item(Arc<dyn ItemConsumer<T>>),
}

impl<T> ConsumerSpec<T> {
    /// Wrap a queue-style consume function.
    pub fn queue(consumer: impl QueueConsumer<T> + 'static) -> Self {
        Self::Queue(Arc::new(consumer))
    }

    /// Wrap an item-style consume function.
    pub fn item(consumer: impl ItemConsumer<T> + 'static) -> Self {
        Self::Item(Arc::new(consumer))
    }

    /// Short label for logging.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Queue(_) => "queue",
            Self::Item(_) => "item",
        }
    }
}

impl<T> Clone for ConsumerSpec<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Queue(consumer) => Self::Queue(Arc::clone(consumer)),
            Self::Item(consumer) => Self::Item(Arc::clone(consumer)),
        }
    }
}

impl<T> fmt::Debug for ConsumerSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConsumerSpec").field(&self.shape()).finish()
    }
}
