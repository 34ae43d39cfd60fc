//! Orderflow order API implementation.
//!
//! This module implements the order endpoints: submission through the
//! intake handler and retrieval by identifier, mapping pipeline errors to
//! their HTTP representations.

use orderflow_core::{IntakeHandler, OrderStateError, OrderStateMachine};
use orderflow_types::{ApiError, IntakeResponse, Order};

/// Processes an order submission body.
pub async fn submit_order(
	body: &str,
	intake: &IntakeHandler,
) -> Result<IntakeResponse, ApiError> {
	intake.handle(body).await.map_err(ApiError::from)
}

/// Retrieves a stored order by identifier.
pub async fn get_order_by_id(
	id: &str,
	orders: &OrderStateMachine,
) -> Result<Order, ApiError> {
	orders.get_order(id).await.map_err(|e| match e {
		OrderStateError::NotFound(id) => ApiError::NotFound {
			message: format!("order not found: {}", id),
		},
		other => ApiError::Internal {
			message: "failed to read order".to_string(),
			details: Some(other.to_string()),
		},
	})
}
