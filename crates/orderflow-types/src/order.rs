//! Order types for the orderflow pipeline.
//!
//! This module defines the order record persisted in the order store, the
//! status values it moves through, and the ephemeral messages that carry
//! order references between the intake and processing stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An order tracked through the pipeline.
///
/// One record per order is kept in the order store, keyed by `order_id`.
/// The identifier is assigned at intake and never changes; the status is
/// advanced by the processing handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order, generated at intake.
	pub order_id: String,
	/// Opaque caller-supplied customer identifier.
	pub customer_id: String,
	/// Caller-supplied item descriptors, kept in submission order.
	pub items: Vec<serde_json::Value>,
	/// Current status of the order.
	pub status: OrderStatus,
}

impl Order {
	/// Creates a new order in the `Received` state with a fresh identifier.
	pub fn new(customer_id: String, items: Vec<serde_json::Value>) -> Self {
		Self {
			order_id: Uuid::new_v4().to_string(),
			customer_id,
			items,
			status: OrderStatus::Received,
		}
	}
}

/// Status values an order moves through.
///
/// Advancement is monotonic by handler discipline only: nothing in the
/// store rejects an out-of-order or repeated write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
	/// Persisted by the intake handler on submission.
	Received,
	/// Written by the processing handler before it runs business logic.
	Processing,
	/// Terminal state written once processing is finished.
	Completed,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Received => write!(f, "RECEIVED"),
			OrderStatus::Processing => write!(f, "PROCESSING"),
			OrderStatus::Completed => write!(f, "COMPLETED"),
		}
	}
}

/// A validated order submission.
///
/// Field presence is checked against the raw JSON body before typed
/// deserialization, so callers get told exactly which fields are absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
	/// Opaque customer identifier; required, presence-only validation.
	pub customer_id: String,
	/// Item descriptors; required, no schema validation beyond presence.
	pub items: Vec<serde_json::Value>,
}

impl OrderSubmission {
	/// Fields a submission must carry.
	pub const REQUIRED_FIELDS: [&'static str; 2] = ["customerId", "items"];

	/// Returns the required fields absent from a raw submission body.
	pub fn missing_fields(body: &serde_json::Value) -> Vec<String> {
		Self::REQUIRED_FIELDS
			.iter()
			.filter(|field| body.get(**field).is_none())
			.map(|field| field.to_string())
			.collect()
	}
}

/// Work queue message referencing an order.
///
/// Produced by the intake handler, consumed and discarded by the processing
/// handler. Carries no identity beyond the queue's own delivery semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
	/// Identifier of the order to process.
	pub order_id: String,
}

/// Completion notification payload.
///
/// Published to the notification channel when an order finishes processing;
/// not retained by the pipeline after publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
	/// Identifier of the processed order.
	pub order_id: String,
	/// Status the order reached.
	pub status: OrderStatus,
}
