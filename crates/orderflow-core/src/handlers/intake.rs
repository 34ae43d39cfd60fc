//! Intake handler for accepting order submissions.
//!
//! Validates one submission per invocation, persists the new order in the
//! `Received` state, and enqueues a work message referencing it. At most
//! one store write and one queue publish happen per call; there are no
//! internal retries.

use crate::state::OrderStateMachine;
use orderflow_queue::QueueService;
use orderflow_types::{IntakeResponse, Order, OrderSubmission, QueueMessage};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Errors that can occur while handling a submission.
///
/// The first two variants are client errors with no side effects; the last
/// two are dependent-service failures whose cause is surfaced to the
/// caller.
#[derive(Debug, Error)]
pub enum IntakeError {
	#[error("invalid JSON in request body")]
	InvalidPayload,
	#[error("missing required fields: {}", .fields.join(", "))]
	MissingFields { fields: Vec<String> },
	#[error("failed to write order to storage")]
	Store { details: String },
	#[error("failed to enqueue order for processing")]
	Enqueue { details: String },
}

/// Validation failures become 400s carrying only the message; dependent
/// service failures become 500s with the underlying cause in `details`.
impl From<IntakeError> for orderflow_types::ApiError {
	fn from(e: IntakeError) -> Self {
		use orderflow_types::ApiError;

		match &e {
			IntakeError::InvalidPayload | IntakeError::MissingFields { .. } => {
				ApiError::BadRequest {
					message: e.to_string(),
				}
			},
			IntakeError::Store { details } | IntakeError::Enqueue { details } => {
				ApiError::Internal {
					message: e.to_string(),
					details: Some(details.clone()),
				}
			},
		}
	}
}

/// Handler that turns a submission into a stored order plus queued work.
pub struct IntakeHandler {
	state: Arc<OrderStateMachine>,
	queue: Arc<QueueService>,
}

impl IntakeHandler {
	pub fn new(state: Arc<OrderStateMachine>, queue: Arc<QueueService>) -> Self {
		Self { state, queue }
	}

	/// Handles one submission body.
	///
	/// Validation failures return before any side effect. A store failure
	/// returns before the enqueue is attempted; an enqueue failure leaves
	/// the stored `Received` record behind as an orphan.
	#[instrument(skip_all)]
	pub async fn handle(&self, body: &str) -> Result<IntakeResponse, IntakeError> {
		let submission = parse_submission(body)?;

		let order = Order::new(submission.customer_id, submission.items);

		self.state.store_order(&order).await.map_err(|e| {
			warn!(error = %e, "order store write failed");
			IntakeError::Store {
				details: e.to_string(),
			}
		})?;

		self.queue
			.send_message(&QueueMessage {
				order_id: order.order_id.clone(),
			})
			.await
			.map_err(|e| {
				warn!(order_id = %order.order_id, error = %e, "work enqueue failed");
				IntakeError::Enqueue {
					details: e.to_string(),
				}
			})?;

		info!(order_id = %order.order_id, "order received");

		Ok(IntakeResponse {
			message: "Order received".to_string(),
			order_id: order.order_id,
		})
	}
}

/// Parses and validates a raw submission body.
///
/// Presence of the required fields is checked against the raw JSON so the
/// error can name exactly which fields are absent; everything else about
/// the payload is taken as-is.
fn parse_submission(body: &str) -> Result<OrderSubmission, IntakeError> {
	let value: serde_json::Value =
		serde_json::from_str(body).map_err(|_| IntakeError::InvalidPayload)?;

	let fields = OrderSubmission::missing_fields(&value);
	if !fields.is_empty() {
		return Err(IntakeError::MissingFields { fields });
	}

	serde_json::from_value(value).map_err(|_| IntakeError::InvalidPayload)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::support::{FailingQueue, FailingStorage, RecordingStorage};
	use orderflow_queue::implementations::memory::MemoryQueue;
	use orderflow_storage::StorageService;
	use orderflow_types::OrderStatus;

	fn handler_over(
		storage: RecordingStorage,
		queue: MemoryQueue,
	) -> (IntakeHandler, Arc<OrderStateMachine>, Arc<QueueService>) {
		let state = Arc::new(OrderStateMachine::new(Arc::new(StorageService::new(
			Box::new(storage),
			"Orders",
		))));
		let queue = Arc::new(QueueService::new(Box::new(queue)));
		(
			IntakeHandler::new(Arc::clone(&state), Arc::clone(&queue)),
			state,
			queue,
		)
	}

	#[tokio::test]
	async fn valid_submission_stores_order_and_enqueues_reference() {
		let (handler, state, queue) = handler_over(RecordingStorage::new(), MemoryQueue::new());

		let response = handler
			.handle(r#"{"customerId":"c1","items":["a","b"]}"#)
			.await
			.unwrap();

		assert!(!response.order_id.is_empty());
		assert_eq!(response.message, "Order received");

		let order = state.get_order(&response.order_id).await.unwrap();
		assert_eq!(order.status, OrderStatus::Received);
		assert_eq!(order.customer_id, "c1");
		assert_eq!(order.items.len(), 2);

		let records = queue.receive(10).await.unwrap();
		assert_eq!(records.len(), 1);
		let message: QueueMessage = serde_json::from_str(&records[0].body).unwrap();
		assert_eq!(message.order_id, response.order_id);
	}

	#[tokio::test]
	async fn order_ids_are_unique_across_submissions() {
		let (handler, _, _) = handler_over(RecordingStorage::new(), MemoryQueue::new());

		let a = handler
			.handle(r#"{"customerId":"c1","items":[]}"#)
			.await
			.unwrap();
		let b = handler
			.handle(r#"{"customerId":"c1","items":[]}"#)
			.await
			.unwrap();

		assert_ne!(a.order_id, b.order_id);
	}

	#[tokio::test]
	async fn malformed_json_has_no_side_effects() {
		let storage = RecordingStorage::new();
		let writes = Arc::clone(&storage.writes);
		let queue = MemoryQueue::new();
		let (handler, _, _) = handler_over(storage, queue.clone());

		let result = handler.handle("{not json").await;

		assert!(matches!(result, Err(IntakeError::InvalidPayload)));
		assert!(writes.lock().await.is_empty());
		assert!(queue.is_empty().await);
	}

	#[tokio::test]
	async fn missing_fields_are_named_with_no_side_effects() {
		let storage = RecordingStorage::new();
		let writes = Arc::clone(&storage.writes);
		let queue = MemoryQueue::new();
		let (handler, _, _) = handler_over(storage, queue.clone());

		let result = handler.handle(r#"{"items":[]}"#).await;
		match result {
			Err(IntakeError::MissingFields { fields }) => {
				assert_eq!(fields, vec!["customerId"])
			},
			other => panic!("unexpected result: {:?}", other),
		}

		let result = handler.handle("{}").await;
		match result {
			Err(IntakeError::MissingFields { fields }) => {
				assert_eq!(fields, vec!["customerId", "items"])
			},
			other => panic!("unexpected result: {:?}", other),
		}

		assert!(writes.lock().await.is_empty());
		assert!(queue.is_empty().await);
	}

	#[tokio::test]
	async fn store_failure_surfaces_details_and_skips_enqueue() {
		let queue = MemoryQueue::new();
		let state = Arc::new(OrderStateMachine::new(Arc::new(StorageService::new(
			Box::new(FailingStorage),
			"Orders",
		))));
		let handler =
			IntakeHandler::new(state, Arc::new(QueueService::new(Box::new(queue.clone()))));

		let result = handler.handle(r#"{"customerId":"c1","items":[]}"#).await;

		match result {
			Err(IntakeError::Store { details }) => assert!(details.contains("store offline")),
			other => panic!("unexpected result: {:?}", other),
		}
		assert!(queue.is_empty().await);
	}

	#[tokio::test]
	async fn enqueue_failure_leaves_orphaned_record() {
		let storage = RecordingStorage::new();
		let writes = Arc::clone(&storage.writes);
		let state = Arc::new(OrderStateMachine::new(Arc::new(StorageService::new(
			Box::new(storage),
			"Orders",
		))));
		let handler = IntakeHandler::new(
			Arc::clone(&state),
			Arc::new(QueueService::new(Box::new(FailingQueue))),
		);

		let result = handler.handle(r#"{"customerId":"c1","items":[]}"#).await;

		match result {
			Err(IntakeError::Enqueue { details }) => {
				assert!(details.contains("queue unreachable"))
			},
			other => panic!("unexpected result: {:?}", other),
		}

		// The order was written before the enqueue failed and is not
		// rolled back.
		let writes = writes.lock().await;
		assert_eq!(writes.len(), 1);
		let orphan: Order = serde_json::from_slice(&writes[0]).unwrap();
		assert_eq!(orphan.status, OrderStatus::Received);
	}
}
