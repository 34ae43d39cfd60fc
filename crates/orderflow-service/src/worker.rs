//! Queue-draining worker loop.
//!
//! Polls the work queue and hands each non-empty batch to the processing
//! handler. Per-record failures are already captured in the batch report;
//! the worker only logs the aggregate and keeps going. A receive failure
//! is logged and retried on the next poll; redelivery of anything lost is
//! the queue's concern, not the worker's.

use orderflow_config::WorkerConfig;
use orderflow_core::{BatchReport, ProcessHandler};
use orderflow_queue::{QueueError, QueueService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs the worker until the surrounding task is cancelled.
pub async fn run(
	queue: Arc<QueueService>,
	processor: Arc<ProcessHandler>,
	config: WorkerConfig,
) -> Result<(), QueueError> {
	info!(
		batch_size = config.batch_size,
		poll_interval_ms = config.poll_interval_ms,
		"Worker started"
	);

	let idle = Duration::from_millis(config.poll_interval_ms);

	loop {
		match drain_once(&queue, &processor, config.batch_size).await {
			// Keep draining back-to-back while work is flowing.
			Ok(Some(_)) => {},
			Ok(None) => tokio::time::sleep(idle).await,
			Err(e) => {
				warn!(error = %e, "queue receive failed");
				tokio::time::sleep(idle).await;
			},
		}
	}
}

/// Takes one batch from the queue and processes it.
///
/// Returns `None` when the queue had nothing to deliver.
pub async fn drain_once(
	queue: &QueueService,
	processor: &ProcessHandler,
	batch_size: usize,
) -> Result<Option<BatchReport>, QueueError> {
	let records = queue.receive(batch_size).await?;
	if records.is_empty() {
		return Ok(None);
	}

	let report = processor.handle_batch(&records).await;
	let summary = report.summary();
	debug!(
		completed = report.completed(),
		skipped = report.skipped(),
		status = %summary.status,
		"Processed batch"
	);

	Ok(Some(report))
}
