//! Fan out a paginated source to a pool of queue-style consumers.
//!
//! A single producer walks a page-token API (simulated here), feeding every
//! record into the shared queue and completing once the last page is seen.
//! Ten consumers drive their own poll loops until the queue is
//! drained-and-complete.
//!
//! Run with: `cargo run --example paginated_fetch`

use std::time::Duration;

use async_trait::async_trait;
use weir::{
    ConsumerHandle, ConsumerSpec, Producer, ProducerHandle, QueueConsumer, WorkloadConfig,
    WorkloadLimits, WorkloadRuntime,
};

#[derive(Clone, Debug)]
struct Record {
    id: u64,
    payload: String,
}

/// Simulated page-token API: returns a batch of records and the next token,
/// or `None` when the source is exhausted.
async fn fetch_page(token: Option<u64>) -> (Vec<Record>, Option<u64>) {
    let page = token.unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(20)).await;
    let records = (0..25)
        .map(|i| {
            let id = page * 25 + i;
            Record {
                id,
                payload: format!("record-{id}"),
            }
        })
        .collect();
    let next = if page + 1 < 8 { Some(page + 1) } else { None };
    (records, next)
}

struct PageWalker;

#[async_trait]
impl Producer<Record> for PageWalker {
    async fn produce(&self, queue: ProducerHandle<Record>) -> anyhow::Result<()> {
        let mut token = None;
        loop {
            let (records, next) = fetch_page(token).await;
            for record in records {
                queue.put(record).await;
            }
            match next {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        // Single producer: completing here lets consumers exit as soon as the
        // buffer drains, before the runtime's own finalization.
        queue.complete();
        Ok(())
    }
}

struct RecordPrinter;

#[async_trait]
impl QueueConsumer<Record> for RecordPrinter {
    async fn consume(&self, queue: ConsumerHandle<Record>) -> anyhow::Result<()> {
        while !queue.completed() {
            if let Some(record) = queue.poll(Duration::from_millis(10)).await {
                tracing::info!(id = record.id, payload = %record.payload, "processing record");
            }
        }
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
        PageWalker,
        ConsumerSpec::queue(RecordPrinter),
        WorkloadLimits::default()
            .with_buffer_capacity(10)
            .with_consumer_count(10),
    )?;

    let stats = WorkloadRuntime::new(config).run().await?;
    tracing::info!(
        items_produced = stats.items_produced,
        items_consumed = stats.items_consumed,
        elapsed_ms = stats.elapsed().num_milliseconds(),
        "paginated fetch finished"
    );
    Ok(())
}
