use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

struct QueueState<T> {
    items: VecDeque<T>,
    failure: Option<anyhow::Error>,
}

/// Capacity-bounded FIFO buffer shared by all producer and consumer tasks of
/// a single workload run.
///
/// The queue carries a monotonic completion flag alongside the buffer: once
/// set it is never cleared, and [`CompletionQueue::completed`] reports true
/// only when the flag is set *and* the buffer has been drained. A failure
/// cause recorded via [`CompletionQueue::fail`] is retained first-wins and
/// later surfaced as the run outcome.
///
/// One queue is created per run and discarded afterwards.
pub struct CompletionQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    completed: AtomicBool,
    produced: AtomicU64,
    consumed: AtomicU64,
    space_available: Notify,
    items_available: Notify,
}

impl<T> CompletionQueue<T> {
    /// Create a queue bounded to `capacity` buffered items.
    ///
    /// `capacity` must be non-zero; the validating [`WorkloadConfig`]
    /// constructor guarantees this for runtime-created queues.
    ///
    /// [`WorkloadConfig`]: crate::config::WorkloadConfig
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                failure: None,
            }),
            completed: AtomicBool::new(false),
            produced: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            space_available: Notify::new(),
            items_available: Notify::new(),
        }
    }

    /// Enqueue an item, waiting while the buffer is at capacity.
    ///
    /// Items are delivered in the order the buffer received them across all
    /// producers combined. Cancelling the calling task abandons the wait
    /// without enqueueing.
    pub async fn put(&self, item: T) {
        loop {
            let space = self.space_available.notified();
            tokio::pin!(space);
            space.as_mut().enable();
            {
                let mut state = self.state.lock();
                if state.items.len() < self.capacity {
                    state.items.push_back(item);
                    break;
                }
            }
            space.await;
        }
        self.produced.fetch_add(1, Ordering::Relaxed);
        self.items_available.notify_waiters();
    }

    /// Set the completion flag.
    ///
    /// Idempotent and monotonic; callers must only invoke this once they will
    /// never `put` again. Items still buffered remain consumable.
    pub fn complete(&self) {
        self.completed.store(true, Ordering::SeqCst);
        self.items_available.notify_waiters();
    }

    /// Set the completion flag and record `cause` as the run's failure.
    ///
    /// The first recorded cause wins; later calls (including `fail` after
    /// `complete`) never clear the flag or an already-recorded cause.
    pub fn fail(&self, cause: anyhow::Error) {
        {
            let mut state = self.state.lock();
            if state.failure.is_none() {
                state.failure = Some(cause);
            }
        }
        self.completed.store(true, Ordering::SeqCst);
        self.items_available.notify_waiters();
    }

    /// True iff the completion flag is set and the buffer is empty.
    ///
    /// Checking the flag alone would let consumers exit while items are still
    /// buffered, so both conditions are required. Once true this never
    /// reverts: the flag is monotonic and completed queues receive no new
    /// items by contract.
    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst) && self.state.lock().items.is_empty()
    }

    /// Dequeue the next item, waiting until one is available.
    ///
    /// Returns `None` iff the queue is drained-and-complete; on an already
    /// drained-and-complete queue this returns immediately rather than
    /// blocking forever.
    pub async fn take(&self) -> Option<T> {
        loop {
            let available = self.items_available.notified();
            tokio::pin!(available);
            available.as_mut().enable();
            {
                let mut state = self.state.lock();
                if let Some(item) = state.items.pop_front() {
                    drop(state);
                    self.consumed.fetch_add(1, Ordering::Relaxed);
                    self.space_available.notify_waiters();
                    return Some(item);
                }
                if self.completed.load(Ordering::SeqCst) {
                    return None;
                }
            }
            available.await;
        }
    }

    /// Like [`take`](Self::take), but gives up after `timeout`.
    ///
    /// Returns `None` both on timeout and on drained-and-complete; consumer
    /// loops distinguish the two by re-checking [`completed`](Self::completed).
    pub async fn poll(&self, timeout: Duration) -> Option<T> {
        match tokio::time::timeout(timeout, self.take()).await {
            Ok(item) => item,
            Err(_) => None,
        }
    }

    /// Number of items currently buffered.
    pub fn depth(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Configured buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total items successfully enqueued so far.
    pub fn items_produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    /// Total items successfully dequeued so far.
    pub fn items_consumed(&self) -> u64 {
        self.consumed.load(Ordering::Relaxed)
    }

    /// Take the recorded failure cause, if any, leaving the flag set.
    pub(crate) fn take_failure(&self) -> Option<anyhow::Error> {
        self.state.lock().failure.take()
    }
}

impl<T> fmt::Debug for CompletionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("CompletionQueue");
        debug.field("capacity", &self.capacity);
        match self.state.try_lock() {
            Some(state) => {
                debug.field("depth", &state.items.len());
                debug.field("failed", &state.failure.is_some());
            }
            None => {
                debug.field("depth", &"<locked>");
            }
        }
        debug
            .field("completed_flag", &self.completed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Producer-side view of a [`CompletionQueue`].
///
/// Exposes only the operations a produce function may perform: `put`,
/// `complete`, `fail`. With a single producer, calling
/// [`complete`](Self::complete) once the source is exhausted lets consumers
/// drain and exit as early as possible; with multiple producers, completion
/// is normally left to the runtime, which finalizes the queue once every
/// producer has reached a terminal state.
pub struct ProducerHandle<T> {
    queue: Arc<CompletionQueue<T>>,
}

impl<T> ProducerHandle<T> {
    pub(crate) fn new(queue: Arc<CompletionQueue<T>>) -> Self {
        Self { queue }
    }

    /// Enqueue an item, waiting while the buffer is at capacity.
    pub async fn put(&self, item: T) {
        self.queue.put(item).await;
    }

    /// Signal that no further items will ever be enqueued.
    pub fn complete(&self) {
        self.queue.complete();
    }

    /// Signal that production cannot finish normally.
    ///
    /// Produce functions rarely need this directly: returning an error has
    /// the same effect, routed through the runtime.
    pub fn fail(&self, cause: anyhow::Error) {
        self.queue.fail(cause);
    }
}

impl<T> Clone for ProducerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T> fmt::Debug for ProducerHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProducerHandle").field(&self.queue).finish()
    }
}

/// Consumer-side view of a [`CompletionQueue`].
///
/// Exposes only the operations a consume function may perform: `completed`,
/// `take`, `poll`, plus the read-only depth. Queue-style consumers should
/// loop, polling with a short timeout and re-checking
/// [`completed`](Self::completed) each iteration.
pub struct ConsumerHandle<T> {
    queue: Arc<CompletionQueue<T>>,
}

impl<T> ConsumerHandle<T> {
    pub(crate) fn new(queue: Arc<CompletionQueue<T>>) -> Self {
        Self { queue }
    }

    /// True iff nothing is buffered and nothing will ever arrive again.
    pub fn completed(&self) -> bool {
        self.queue.completed()
    }

    /// Dequeue the next item; `None` means drained-and-complete.
    pub async fn take(&self) -> Option<T> {
        self.queue.take().await
    }

    /// Dequeue with a timeout; `None` on timeout or drained-and-complete.
    pub async fn poll(&self, timeout: Duration) -> Option<T> {
        self.queue.poll(timeout).await
    }

    /// Number of items currently buffered.
    pub fn depth(&self) -> usize {
        self.queue.depth()
    }
}

impl<T> Clone for ConsumerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T> fmt::Debug for ConsumerHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConsumerHandle").field(&self.queue).finish()
    }
}
