use std::time::Duration;

use async_trait::async_trait;
use weir::{Producer, ProducerHandle};

/// Emits the items `0..count`, optionally pausing between items.
///
/// With `self_complete` set (single-producer workloads only), the producer
/// calls `complete()` on its handle once the range is exhausted, letting
/// consumers exit before the runtime's own finalization.
#[derive(Clone, Debug)]
pub struct RangeProducer {
    count: u64,
    delay: Option<Duration>,
    self_complete: bool,
}

impl RangeProducer {
    /// Emit `count` items, as fast as the buffer allows.
    pub fn new(count: u64) -> Self {
        Self {
            count,
            delay: None,
            self_complete: false,
        }
    }

    /// Pause for `delay` after each item.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Call `complete()` after the last item. Single-producer workloads only.
    pub fn with_self_complete(mut self) -> Self {
        self.self_complete = true;
        self
    }
}

#[async_trait]
impl Producer<u64> for RangeProducer {
    async fn produce(&self, queue: ProducerHandle<u64>) -> anyhow::Result<()> {
        for i in 0..self.count {
            queue.put(i).await;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }
        if self.self_complete {
            queue.complete();
        }
        Ok(())
    }
}

/// Emits `emit_before_failure` items and then errors without completing.
#[derive(Clone, Debug)]
pub struct FailingProducer {
    emit_before_failure: u64,
    message: String,
}

impl FailingProducer {
    pub fn new(emit_before_failure: u64, message: impl Into<String>) -> Self {
        Self {
            emit_before_failure,
            message: message.into(),
        }
    }
}

#[async_trait]
impl Producer<u64> for FailingProducer {
    async fn produce(&self, queue: ProducerHandle<u64>) -> anyhow::Result<()> {
        for i in 0..self.emit_before_failure {
            queue.put(i).await;
        }
        anyhow::bail!("{}", self.message)
    }
}
