//! Order state machine implementation.
//!
//! Orders move `RECEIVED -> PROCESSING -> COMPLETED`, advanced only by the
//! processing handler. The store enforces nothing: writes are unguarded
//! read-modify-write, so concurrent writers race, the last write wins, and
//! redelivered queue messages re-run the same transitions.

use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{Order, OrderStatus};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during order state management.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Order not found: {0}")]
	NotFound(String),
}

impl OrderStateError {
	fn from_storage(order_id: &str, err: StorageError) -> Self {
		match err {
			StorageError::NotFound => OrderStateError::NotFound(order_id.to_string()),
			other => OrderStateError::Storage(other.to_string()),
		}
	}
}

/// Manages order persistence and status transitions.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Stores a new order record.
	pub async fn store_order(&self, order: &Order) -> Result<(), OrderStateError> {
		self.storage
			.store(&order.order_id, order)
			.await
			.map_err(|e| OrderStateError::from_storage(&order.order_id, e))
	}

	/// Gets an order by ID.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderStateError> {
		self.storage
			.retrieve(order_id)
			.await
			.map_err(|e| OrderStateError::from_storage(order_id, e))
	}

	/// Sets an order's status and persists the updated record.
	///
	/// Updating a missing order is a hard `NotFound` error. The current
	/// status is not consulted before writing, so repeated or out-of-order
	/// writes are accepted.
	pub async fn set_status(
		&self,
		order_id: &str,
		status: OrderStatus,
	) -> Result<Order, OrderStateError> {
		let mut order: Order = self
			.storage
			.retrieve(order_id)
			.await
			.map_err(|e| OrderStateError::from_storage(order_id, e))?;

		order.status = status;

		self.storage
			.update(order_id, &order)
			.await
			.map_err(|e| OrderStateError::from_storage(order_id, e))?;

		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderflow_storage::implementations::memory::MemoryStorage;

	fn machine() -> OrderStateMachine {
		let storage = StorageService::new(Box::new(MemoryStorage::new()), "Orders");
		OrderStateMachine::new(Arc::new(storage))
	}

	#[tokio::test]
	async fn stores_and_advances_an_order() {
		let machine = machine();
		let order = Order::new("c1".into(), vec![]);
		let id = order.order_id.clone();

		machine.store_order(&order).await.unwrap();
		assert_eq!(machine.get_order(&id).await.unwrap().status, OrderStatus::Received);

		machine.set_status(&id, OrderStatus::Processing).await.unwrap();
		let updated = machine.set_status(&id, OrderStatus::Completed).await.unwrap();

		assert_eq!(updated.status, OrderStatus::Completed);
		// The rest of the record is untouched by status writes.
		assert_eq!(updated.customer_id, "c1");
	}

	#[tokio::test]
	async fn set_status_on_missing_order_is_not_found() {
		let machine = machine();
		let result = machine.set_status("nope", OrderStatus::Processing).await;
		assert!(matches!(result, Err(OrderStateError::NotFound(id)) if id == "nope"));
	}

	#[tokio::test]
	async fn repeated_transitions_are_accepted() {
		// No terminal-state protection: a completed order can be driven
		// through the same transitions again.
		let machine = machine();
		let order = Order::new("c1".into(), vec![]);
		let id = order.order_id.clone();
		machine.store_order(&order).await.unwrap();

		machine.set_status(&id, OrderStatus::Completed).await.unwrap();
		machine.set_status(&id, OrderStatus::Processing).await.unwrap();

		assert_eq!(
			machine.get_order(&id).await.unwrap().status,
			OrderStatus::Processing
		);
	}
}
