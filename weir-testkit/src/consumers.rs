use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use weir::{ConsumerHandle, ItemConsumer, QueueConsumer};

/// Item-style consumer that counts what it sees, optionally pausing per item.
#[derive(Clone, Debug)]
pub struct CountingItemConsumer {
    counted: Arc<AtomicU64>,
    delay: Option<Duration>,
}

impl CountingItemConsumer {
    pub fn new() -> Self {
        Self {
            counted: Arc::new(AtomicU64::new(0)),
            delay: None,
        }
    }

    /// Pause for `delay` while handling each item.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter; grab a clone before moving the consumer into a config.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.counted)
    }
}

impl Default for CountingItemConsumer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemConsumer<u64> for CountingItemConsumer {
    async fn consume(&self, _item: u64) -> anyhow::Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.counted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Queue-style consumer that drives the canonical poll loop and counts items.
#[derive(Clone, Debug)]
pub struct CountingQueueConsumer {
    counted: Arc<AtomicU64>,
    poll_interval: Duration,
}

impl CountingQueueConsumer {
    pub fn new() -> Self {
        Self {
            counted: Arc::new(AtomicU64::new(0)),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Override the poll timeout used by the loop.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Shared counter; grab a clone before moving the consumer into a config.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.counted)
    }
}

impl Default for CountingQueueConsumer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueConsumer<u64> for CountingQueueConsumer {
    async fn consume(&self, queue: ConsumerHandle<u64>) -> anyhow::Result<()> {
        while !queue.completed() {
            if queue.poll(self.poll_interval).await.is_some() {
                self.counted.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

/// Item-style consumer that records every item it is handed.
#[derive(Clone, Debug)]
pub struct CollectingItemConsumer {
    items: Arc<Mutex<Vec<u64>>>,
}

impl CollectingItemConsumer {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared sink; grab a clone before moving the consumer into a config.
    pub fn sink(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.items)
    }

    /// Snapshot of everything recorded so far.
    pub fn collected(&self) -> Vec<u64> {
        self.items.lock().clone()
    }
}

impl Default for CollectingItemConsumer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemConsumer<u64> for CollectingItemConsumer {
    async fn consume(&self, item: u64) -> anyhow::Result<()> {
        self.items.lock().push(item);
        Ok(())
    }
}
