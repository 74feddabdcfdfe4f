//! Item-style pipeline: the runtime drives the consumer loop.
//!
//! Three producers emit batches of work ids; the default item loop feeds each
//! id to the consumer one at a time, so the consumer never touches the queue.
//!
//! Run with: `cargo run --example item_pipeline`

use std::time::Duration;

use async_trait::async_trait;
use weir::{
    ConsumerSpec, ItemConsumer, Producer, ProducerHandle, WorkloadConfig, WorkloadLimits,
    WorkloadRuntime,
};

struct BatchProducer {
    batch: u64,
}

#[async_trait]
impl Producer<u64> for BatchProducer {
    async fn produce(&self, queue: ProducerHandle<u64>) -> anyhow::Result<()> {
        for i in 0..self.batch {
            queue.put(i).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        Ok(())
    }
}

struct WorkHandler;

#[async_trait]
impl ItemConsumer<u64> for WorkHandler {
    async fn consume(&self, item: u64) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        tracing::info!(item, "handled");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = WorkloadConfig::new(
        BatchProducer { batch: 50 },
        ConsumerSpec::item(WorkHandler),
        WorkloadLimits::default()
            .with_buffer_capacity(10)
            .with_producer_count(3)
            .with_consumer_count(5),
    )?;

    let stats = WorkloadRuntime::new(config).run().await?;
    tracing::info!(
        items_produced = stats.items_produced,
        items_consumed = stats.items_consumed,
        "pipeline finished"
    );
    Ok(())
}
