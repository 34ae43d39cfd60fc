//! Work queue module for the orderflow pipeline.
//!
//! This module provides abstractions for the queue that carries order
//! references from the intake handler to the processing handler. Delivery
//! semantics are whatever the backing queue provides; the pipeline assumes
//! at-least-once and no ordering guarantees.

use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry};
use serde::Serialize;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
	/// Error that occurs during serialization of a message body.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the queue backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A record delivered from the queue.
///
/// Carries only the raw message body; any further identity (receipt
/// handles, delivery counts) belongs to the backing queue, not to the
/// pipeline.
#[derive(Debug, Clone)]
pub struct QueueRecord {
	/// Raw message body as enqueued.
	pub body: String,
}

/// Trait defining the low-level interface for queue backends.
#[async_trait]
pub trait QueueInterface: Send + Sync {
	/// Appends a raw message body to the queue.
	async fn send(&self, body: String) -> Result<(), QueueError>;

	/// Takes up to `max` records from the head of the queue.
	///
	/// Returns an empty vector when the queue has nothing to deliver.
	async fn receive(&self, max: usize) -> Result<Vec<QueueRecord>, QueueError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for queue factory functions.
pub type QueueFactory = fn(&toml::Value) -> Result<Box<dyn QueueInterface>, QueueError>;

/// Registry trait for queue implementations.
pub trait QueueRegistry: ImplementationRegistry<Factory = QueueFactory> {}

/// Get all registered queue implementations.
pub fn get_all_implementations() -> Vec<(&'static str, QueueFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// High-level queue service that provides typed sends.
///
/// The QueueService wraps a low-level queue backend, serializing messages
/// to JSON before they are enqueued.
pub struct QueueService {
	/// The underlying queue backend implementation.
	backend: Box<dyn QueueInterface>,
}

impl QueueService {
	/// Creates a new QueueService with the specified backend.
	pub fn new(backend: Box<dyn QueueInterface>) -> Self {
		Self { backend }
	}

	/// Serializes a message to JSON and enqueues it.
	pub async fn send_message<T: Serialize>(&self, message: &T) -> Result<(), QueueError> {
		let body = serde_json::to_string(message)
			.map_err(|e| QueueError::Serialization(e.to_string()))?;
		self.backend.send(body).await
	}

	/// Takes up to `max` records from the queue.
	pub async fn receive(&self, max: usize) -> Result<Vec<QueueRecord>, QueueError> {
		self.backend.receive(max).await
	}
}
