use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::{ConsumerSpec, Producer};

/// Numeric limits for a workload run.
///
/// All counts and the buffer capacity must be greater than zero; the
/// [`WorkloadConfig`] constructor rejects anything else. The shutdown
/// timeouts bound how long the runtime waits for worker-pool quiescence
/// after the join barriers, not how long the tasks themselves may run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkloadLimits {
    /// Maximum number of items buffered between producers and consumers.
    pub buffer_capacity: usize,
    /// Number of concurrent producer tasks.
    pub producer_count: usize,
    /// Number of concurrent consumer tasks.
    pub consumer_count: usize,
    /// Grace period for producer-pool quiescence during shutdown.
    pub producer_shutdown_timeout: Duration,
    /// Grace period for consumer-pool quiescence during shutdown.
    pub consumer_shutdown_timeout: Duration,
}

impl WorkloadLimits {
    /// Set the buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the producer task count.
    pub fn with_producer_count(mut self, count: usize) -> Self {
        self.producer_count = count;
        self
    }

    /// Set the consumer task count.
    pub fn with_consumer_count(mut self, count: usize) -> Self {
        self.consumer_count = count;
        self
    }

    /// Set the producer-pool shutdown grace period.
    pub fn with_producer_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.producer_shutdown_timeout = timeout;
        self
    }

    /// Set the consumer-pool shutdown grace period.
    pub fn with_consumer_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.consumer_shutdown_timeout = timeout;
        self
    }
}

impl Default for WorkloadLimits {
    fn default() -> Self {
        Self {
            buffer_capacity: 1,
            producer_count: 1,
            consumer_count: 1,
            producer_shutdown_timeout: Duration::from_secs(1),
            consumer_shutdown_timeout: Duration::from_secs(1),
        }
    }
}

/// Error raised when a workload configuration is rejected.
///
/// Configuration errors are detected synchronously at construction time,
/// never at run time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The buffer capacity was zero.
    #[error("buffer capacity must be greater than 0")]
    ZeroBufferCapacity,
    /// The producer count was zero.
    #[error("producer count must be greater than 0")]
    ZeroProducerCount,
    /// The consumer count was zero.
    #[error("consumer count must be greater than 0")]
    ZeroConsumerCount,
}

/// Validated, immutable description of one workload run.
///
/// Holds the produce function, the consumer shape (queue-style or item-style,
/// exactly one; the [`ConsumerSpec`] variant makes supplying both or neither
/// unrepresentable), and the numeric limits. Constructed once via
/// [`WorkloadConfig::new`]; nothing is mutated afterwards.
pub struct WorkloadConfig<T> {
    producer: Arc<dyn Producer<T>>,
    consumer: ConsumerSpec<T>,
    limits: WorkloadLimits,
}

impl<T> WorkloadConfig<T> {
    /// Validate all fields at once and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the buffer capacity, producer count, or
    /// consumer count is zero. No partially-valid intermediate state escapes
    /// on failure.
    pub fn new(
        producer: impl Producer<T> + 'static,
        consumer: ConsumerSpec<T>,
        limits: WorkloadLimits,
    ) -> Result<Self, ConfigError> {
        if limits.buffer_capacity == 0 {
            return Err(ConfigError::ZeroBufferCapacity);
        }
        if limits.producer_count == 0 {
            return Err(ConfigError::ZeroProducerCount);
        }
        if limits.consumer_count == 0 {
            return Err(ConfigError::ZeroConsumerCount);
        }
        Ok(Self {
            producer: Arc::new(producer),
            consumer,
            limits,
        })
    }

    /// The produce function shared by all producer tasks.
    pub fn producer(&self) -> Arc<dyn Producer<T>> {
        Arc::clone(&self.producer)
    }

    /// The consumer shape shared by all consumer tasks.
    pub fn consumer(&self) -> ConsumerSpec<T> {
        self.consumer.clone()
    }

    /// The numeric limits for the run.
    pub fn limits(&self) -> &WorkloadLimits {
        &self.limits
    }
}

impl<T> fmt::Debug for WorkloadConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkloadConfig")
            .field("consumer_shape", &self.consumer.shape())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
