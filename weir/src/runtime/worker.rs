use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::queue::{CompletionQueue, ConsumerHandle, ProducerHandle};
use crate::task::{ConsumerSpec, ItemConsumer, Producer};

/// Poll interval of the default item-consumer loop.
pub(crate) const ITEM_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A fixed set of worker tasks spawned for one workload run.
///
/// The pool is populated once at run start and joined as a barrier: the run
/// proceeds only after every worker reaches a terminal state. Shutdown is the
/// safety net for handles that were never joined: each remaining task gets a
/// bounded grace period before being force-aborted.
pub(crate) struct WorkerPool {
    label: &'static str,
    handles: Vec<JoinHandle<anyhow::Result<()>>>,
}

impl WorkerPool {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            label,
            handles: Vec::new(),
        }
    }

    pub(crate) fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.handles.push(tokio::spawn(task));
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Join barrier: wait for every worker's terminal state.
    ///
    /// Returns the first observed error, which covers both task bodies that
    /// returned `Err` and task bodies that panicked. Later errors are logged
    /// and dropped.
    pub(crate) async fn join_all(&mut self) -> Option<anyhow::Error> {
        let mut first_error = None;
        for handle in self.handles.drain(..) {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(anyhow::Error::from(join_err)),
            };
            if let Err(err) = outcome {
                tracing::warn!(pool = self.label, "worker task failed: {err:#}");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        first_error
    }

    /// Bounded-time quiescence: give unjoined workers `grace` collectively,
    /// then force-abort stragglers.
    ///
    /// Returns the number of force-aborted workers. Best-effort and silent to
    /// the caller beyond the warning log.
    pub(crate) async fn shutdown(mut self, grace: Duration) -> usize {
        if self.handles.is_empty() {
            tracing::debug!(pool = self.label, "worker pool already quiescent");
            return 0;
        }

        let deadline = tokio::time::Instant::now() + grace;
        let mut forced = 0usize;
        for mut handle in self.handles.drain(..) {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(err))) => {
                    tracing::warn!(pool = self.label, "worker task failed during shutdown: {err:#}");
                }
                Ok(Err(join_err)) => {
                    tracing::warn!(pool = self.label, "worker task panicked during shutdown: {join_err}");
                }
                Err(_) => {
                    handle.abort();
                    forced += 1;
                }
            }
        }

        if forced > 0 {
            tracing::warn!(
                pool = self.label,
                forced,
                "worker pool did not quiesce in time; force-terminated"
            );
        } else {
            tracing::debug!(pool = self.label, "worker pool quiesced");
        }
        forced
    }
}

/// Run one produce invocation against the shared queue.
///
/// An `Err` return is the producer task's terminal failure; the supervisor
/// turns the first such failure into the run outcome.
pub(crate) async fn run_producer<T: Send + 'static>(
    worker_id: String,
    producer: Arc<dyn Producer<T>>,
    queue: Arc<CompletionQueue<T>>,
) -> anyhow::Result<()> {
    tracing::debug!(worker = %worker_id, "producer started");
    let result = producer.produce(ProducerHandle::new(queue)).await;
    match &result {
        Ok(()) => tracing::debug!(worker = %worker_id, "producer finished"),
        Err(err) => tracing::warn!(worker = %worker_id, "producer failed: {err:#}"),
    }
    result
}

/// Run one consume invocation against the shared queue.
///
/// Consumer errors are isolated: they are logged here and never propagate to
/// the run outcome, so this always returns `Ok`.
pub(crate) async fn run_consumer<T: Send + 'static>(
    worker_id: String,
    consumer: ConsumerSpec<T>,
    queue: Arc<CompletionQueue<T>>,
) -> anyhow::Result<()> {
    tracing::debug!(worker = %worker_id, "consumer started");
    match consumer {
        ConsumerSpec::Queue(consumer) => {
            if let Err(err) = consumer.consume(ConsumerHandle::new(queue)).await {
                tracing::warn!(worker = %worker_id, "queue consumer failed: {err:#}");
            }
        }
        ConsumerSpec::Item(consumer) => {
            run_item_loop(&worker_id, consumer, ConsumerHandle::new(queue)).await;
        }
    }
    tracing::debug!(worker = %worker_id, "consumer finished");
    Ok(())
}

/// Default loop for item-style consumers: poll on a fixed short interval,
/// hand over each item, terminate exactly when the queue is
/// drained-and-complete. Per-item errors are swallowed and logged.
async fn run_item_loop<T>(
    worker_id: &str,
    consumer: Arc<dyn ItemConsumer<T>>,
    queue: ConsumerHandle<T>,
) {
    while !queue.completed() {
        if let Some(item) = queue.poll(ITEM_POLL_INTERVAL).await {
            if let Err(err) = consumer.consume(item).await {
                tracing::warn!(worker = %worker_id, "item consumer error: {err:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Instant;
    use tokio::time::timeout;

    const GUARD: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_join_all_returns_first_error() {
        let mut pool = WorkerPool::new("test");
        pool.spawn(async { Ok(()) });
        pool.spawn(async { Err(anyhow::anyhow!("first")) });
        pool.spawn(async { Err(anyhow::anyhow!("second")) });

        let err = pool.join_all().await.expect("an error should surface");
        assert_eq!(err.to_string(), "first");
        assert_eq!(pool.len(), 0);
    }

    #[tokio::test]
    async fn test_join_all_captures_panic_as_error() {
        let mut pool = WorkerPool::new("test");
        pool.spawn(async { panic!("worker blew up") });

        let err = pool.join_all().await.expect("panic should surface");
        assert!(err.to_string().contains("panic"), "got: {err}");
    }

    #[tokio::test]
    async fn test_shutdown_force_aborts_hung_worker() {
        let mut pool = WorkerPool::new("test");
        pool.spawn(async {
            std::future::pending::<()>().await;
            Ok(())
        });

        let start = Instant::now();
        let forced = pool.shutdown(Duration::from_millis(50)).await;
        assert_eq!(forced, 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_shutdown_of_quiescent_pool_returns_immediately() {
        let mut pool = WorkerPool::new("test");
        pool.spawn(async { Ok(()) });
        pool.join_all().await;

        let start = Instant::now();
        let forced = pool.shutdown(Duration::from_secs(10)).await;
        assert_eq!(forced, 0);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    struct CountingItemConsumer {
        consumed: AtomicU64,
    }

    #[async_trait]
    impl ItemConsumer<u32> for Arc<CountingItemConsumer> {
        async fn consume(&self, _item: u32) -> anyhow::Result<()> {
            self.consumed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_item_loop_drains_queue_then_exits() {
        let queue = Arc::new(CompletionQueue::new(16));
        for i in 0..10u32 {
            queue.put(i).await;
        }
        queue.complete();

        let counter = Arc::new(CountingItemConsumer {
            consumed: AtomicU64::new(0),
        });
        let spec = ConsumerSpec::item(Arc::clone(&counter));
        timeout(
            GUARD,
            run_consumer("consumer-w0".to_string(), spec, Arc::clone(&queue)),
        )
        .await
        .expect("item loop should terminate once drained-and-complete")
        .expect("consumer task reports Ok");

        assert_eq!(counter.consumed.load(Ordering::Relaxed), 10);
        assert!(queue.completed());
    }

    struct FlakyItemConsumer {
        seen: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl ItemConsumer<u32> for Arc<FlakyItemConsumer> {
        async fn consume(&self, item: u32) -> anyhow::Result<()> {
            self.seen.lock().push(item);
            if item % 2 == 0 {
                anyhow::bail!("rejecting even item {item}");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_item_loop_swallows_per_item_errors() {
        let queue = Arc::new(CompletionQueue::new(16));
        for i in 0..6u32 {
            queue.put(i).await;
        }
        queue.complete();

        let flaky = Arc::new(FlakyItemConsumer {
            seen: Mutex::new(Vec::new()),
        });
        let spec = ConsumerSpec::item(Arc::clone(&flaky));
        timeout(
            GUARD,
            run_consumer("consumer-w0".to_string(), spec, Arc::clone(&queue)),
        )
        .await
        .expect("loop must survive item errors")
        .expect("consumer task reports Ok");

        // Every item was still offered, errors notwithstanding.
        assert_eq!(flaky.seen.lock().len(), 6);
    }

    struct ErroringQueueConsumer;

    #[async_trait]
    impl crate::task::QueueConsumer<u32> for ErroringQueueConsumer {
        async fn consume(&self, queue: ConsumerHandle<u32>) -> anyhow::Result<()> {
            let _ = queue.take().await;
            anyhow::bail!("queue consumer gave up")
        }
    }

    #[tokio::test]
    async fn test_queue_consumer_error_is_isolated() {
        let queue = Arc::new(CompletionQueue::new(4));
        queue.put(1u32).await;
        queue.complete();

        let spec = ConsumerSpec::queue(ErroringQueueConsumer);
        let result = timeout(
            GUARD,
            run_consumer("consumer-w0".to_string(), spec, Arc::clone(&queue)),
        )
        .await
        .expect("consumer should reach a terminal state");
        assert!(result.is_ok(), "consumer errors must not propagate");
    }
}
