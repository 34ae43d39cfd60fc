//! Processing handler for draining queued work.
//!
//! Consumes a batch of queue records in one invocation and advances each
//! referenced order to completion, publishing a notification per completed
//! order. Records are handled strictly one after another, and each record's
//! failure is captured in the batch report without touching its siblings.
//! Redelivery and retry belong entirely to the backing queue.

use crate::state::{OrderStateError, OrderStateMachine};
use orderflow_notify::NotifyService;
use orderflow_queue::QueueRecord;
use orderflow_types::{Notification, OrderStatus, ProcessSummary, QueueMessage};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Subject line used for completion notifications.
const NOTIFY_SUBJECT: &str = "Order processed";

/// Errors that can occur while advancing a single record.
#[derive(Debug, Error)]
pub enum ProcessError {
	#[error("invalid work message: {0}")]
	Parse(String),
	#[error(transparent)]
	State(#[from] OrderStateError),
	#[error("notification publish failed: {0}")]
	Notify(String),
}

/// Outcome of one queue record within a batch.
#[derive(Debug)]
pub enum RecordOutcome {
	/// The referenced order reached `Completed` and was notified.
	Completed { order_id: String },
	/// The record was skipped; the order may have been left mid-flight.
	Skipped {
		order_id: Option<String>,
		reason: String,
	},
}

/// Per-record outcomes for one batch invocation.
///
/// The report makes partial failure observable; the outward envelope stays
/// a uniform [`ProcessSummary`] regardless of what it contains.
#[derive(Debug, Default)]
pub struct BatchReport {
	pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
	/// Number of records that completed.
	pub fn completed(&self) -> usize {
		self.outcomes
			.iter()
			.filter(|o| matches!(o, RecordOutcome::Completed { .. }))
			.count()
	}

	/// Number of records that were skipped.
	pub fn skipped(&self) -> usize {
		self.outcomes.len() - self.completed()
	}

	/// The uniform batch envelope.
	pub fn summary(&self) -> ProcessSummary {
		ProcessSummary::done()
	}
}

/// Handler that advances queued orders to completion.
pub struct ProcessHandler {
	state: Arc<OrderStateMachine>,
	notify: Arc<NotifyService>,
}

impl ProcessHandler {
	pub fn new(state: Arc<OrderStateMachine>, notify: Arc<NotifyService>) -> Self {
		Self { state, notify }
	}

	/// Handles one batch of queue records.
	///
	/// Records are processed sequentially; a failed record is logged,
	/// captured in the report, and skipped. Nothing is retried here.
	#[instrument(skip_all, fields(batch = records.len()))]
	pub async fn handle_batch(&self, records: &[QueueRecord]) -> BatchReport {
		let mut report = BatchReport::default();

		for record in records {
			let message = match parse_message(&record.body) {
				Ok(message) => message,
				Err(e) => {
					warn!(error = %e, "skipping undecodable work record");
					report.outcomes.push(RecordOutcome::Skipped {
						order_id: None,
						reason: e.to_string(),
					});
					continue;
				},
			};

			match self.advance(&message.order_id).await {
				Ok(()) => {
					report.outcomes.push(RecordOutcome::Completed {
						order_id: message.order_id,
					});
				},
				Err(e) => {
					warn!(order_id = %message.order_id, error = %e, "skipping failed order");
					report.outcomes.push(RecordOutcome::Skipped {
						order_id: Some(message.order_id),
						reason: e.to_string(),
					});
				},
			}
		}

		report
	}

	/// Drives one order through `Processing` to `Completed` and notifies.
	///
	/// A failure after the first transition leaves the order parked in
	/// `Processing`; a publish failure leaves it `Completed` but
	/// unannounced. Neither is rolled back.
	#[instrument(skip_all, fields(order_id = %order_id))]
	async fn advance(&self, order_id: &str) -> Result<(), ProcessError> {
		self.state
			.set_status(order_id, OrderStatus::Processing)
			.await?;

		// Real fulfillment work would run here, between the two
		// transitions.

		self.state
			.set_status(order_id, OrderStatus::Completed)
			.await?;

		self.notify
			.publish(
				NOTIFY_SUBJECT,
				&Notification {
					order_id: order_id.to_string(),
					status: OrderStatus::Completed,
				},
			)
			.await
			.map_err(|e| ProcessError::Notify(e.to_string()))?;

		info!("order completed");
		Ok(())
	}
}

/// Parses a queue record body into a work message.
fn parse_message(body: &str) -> Result<QueueMessage, ProcessError> {
	serde_json::from_str(body).map_err(|e| ProcessError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::support::{FailingNotifier, RecordingStorage};
	use orderflow_notify::implementations::memory::MemoryNotifier;
	use orderflow_storage::StorageService;
	use orderflow_types::Order;

	struct Fixture {
		handler: ProcessHandler,
		state: Arc<OrderStateMachine>,
		storage: RecordingStorage,
		notifier: MemoryNotifier,
	}

	fn fixture() -> Fixture {
		let storage = RecordingStorage::new();
		let state = Arc::new(OrderStateMachine::new(Arc::new(StorageService::new(
			Box::new(storage.clone()),
			"Orders",
		))));
		let notifier = MemoryNotifier::new();
		let handler = ProcessHandler::new(
			Arc::clone(&state),
			Arc::new(NotifyService::new(Box::new(notifier.clone()))),
		);
		Fixture {
			handler,
			state,
			storage,
			notifier,
		}
	}

	async fn seeded_order(state: &OrderStateMachine) -> Order {
		let order = Order::new("c1".into(), vec![serde_json::json!("a")]);
		state.store_order(&order).await.unwrap();
		order
	}

	fn record_for(order_id: &str) -> QueueRecord {
		QueueRecord {
			body: serde_json::to_string(&QueueMessage {
				order_id: order_id.to_string(),
			})
			.unwrap(),
		}
	}

	#[tokio::test]
	async fn drives_order_through_statuses_in_order_and_notifies_once() {
		let fx = fixture();
		let order = seeded_order(&fx.state).await;

		let report = fx.handler.handle_batch(&[record_for(&order.order_id)]).await;

		assert_eq!(report.completed(), 1);
		assert_eq!(report.skipped(), 0);
		assert_eq!(report.summary().status, "Done");

		// Every write, in sequence: the seed plus the two transitions.
		let writes = fx.storage.writes.lock().await;
		let statuses: Vec<OrderStatus> = writes
			.iter()
			.map(|bytes| serde_json::from_slice::<Order>(bytes).unwrap().status)
			.collect();
		assert_eq!(
			statuses,
			vec![
				OrderStatus::Received,
				OrderStatus::Processing,
				OrderStatus::Completed
			]
		);

		let messages = fx.notifier.handle();
		let messages = messages.lock().await;
		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].subject, "Order processed");
		let notification: Notification = serde_json::from_str(&messages[0].body).unwrap();
		assert_eq!(notification.order_id, order.order_id);
		assert_eq!(notification.status, OrderStatus::Completed);
	}

	#[tokio::test]
	async fn invalid_records_are_skipped_without_aborting_the_batch() {
		let fx = fixture();
		let first = seeded_order(&fx.state).await;
		let second = seeded_order(&fx.state).await;

		let records = vec![
			QueueRecord {
				body: "{not json".into(),
			},
			record_for(&first.order_id),
			QueueRecord {
				body: r#"{"something":"else"}"#.into(),
			},
			record_for(&second.order_id),
		];

		let report = fx.handler.handle_batch(&records).await;

		assert_eq!(report.completed(), 2);
		assert_eq!(report.skipped(), 2);
		// The envelope is uniform no matter how many records failed.
		assert_eq!(report.summary().status, "Done");

		for id in [&first.order_id, &second.order_id] {
			assert_eq!(
				fx.state.get_order(id).await.unwrap().status,
				OrderStatus::Completed
			);
		}
	}

	#[tokio::test]
	async fn unknown_order_reference_is_skipped() {
		let fx = fixture();

		let report = fx.handler.handle_batch(&[record_for("ghost")]).await;

		assert_eq!(report.completed(), 0);
		match &report.outcomes[0] {
			RecordOutcome::Skipped { order_id, reason } => {
				assert_eq!(order_id.as_deref(), Some("ghost"));
				assert!(reason.contains("not found"));
			},
			other => panic!("unexpected outcome: {:?}", other),
		}

		assert!(fx.notifier.handle().lock().await.is_empty());
	}

	#[tokio::test]
	async fn redelivery_is_not_idempotent() {
		// Current behavior, documented rather than desired: a redelivered
		// reference re-runs both transitions and notifies again.
		let fx = fixture();
		let order = seeded_order(&fx.state).await;
		let record = record_for(&order.order_id);

		let first = fx.handler.handle_batch(std::slice::from_ref(&record)).await;
		let second = fx.handler.handle_batch(&[record]).await;

		assert_eq!(first.completed(), 1);
		assert_eq!(second.completed(), 1);
		assert_eq!(fx.notifier.handle().lock().await.len(), 2);
	}

	#[tokio::test]
	async fn publish_failure_leaves_order_completed_but_skipped() {
		let storage = RecordingStorage::new();
		let state = Arc::new(OrderStateMachine::new(Arc::new(StorageService::new(
			Box::new(storage),
			"Orders",
		))));
		let handler = ProcessHandler::new(
			Arc::clone(&state),
			Arc::new(NotifyService::new(Box::new(FailingNotifier))),
		);

		let order = seeded_order(&state).await;
		let report = handler.handle_batch(&[record_for(&order.order_id)]).await;

		assert_eq!(report.completed(), 0);
		assert_eq!(report.skipped(), 1);

		// No rollback: the status write stuck even though the publish
		// failed.
		assert_eq!(
			state.get_order(&order.order_id).await.unwrap().status,
			OrderStatus::Completed
		);
	}
}
