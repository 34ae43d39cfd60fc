//! In-memory queue backend implementation.
//!
//! This module provides a memory-based implementation of the QueueInterface
//! trait, useful for testing and single-process deployments. Delivery is
//! FIFO and exactly-once within the process; nothing is redelivered.

use crate::{QueueError, QueueInterface, QueueRecord};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory queue implementation.
///
/// Messages live in a VecDeque behind a mutex. Clones share the same
/// underlying queue.
#[derive(Clone)]
pub struct MemoryQueue {
	/// Pending message bodies, oldest first.
	messages: Arc<Mutex<VecDeque<String>>>,
}

impl MemoryQueue {
	/// Creates a new MemoryQueue instance.
	pub fn new() -> Self {
		Self {
			messages: Arc::new(Mutex::new(VecDeque::new())),
		}
	}

	/// Returns the number of messages currently queued.
	pub async fn len(&self) -> usize {
		self.messages.lock().await.len()
	}

	/// Returns true when nothing is queued.
	pub async fn is_empty(&self) -> bool {
		self.messages.lock().await.is_empty()
	}
}

impl Default for MemoryQueue {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl QueueInterface for MemoryQueue {
	async fn send(&self, body: String) -> Result<(), QueueError> {
		let mut messages = self.messages.lock().await;
		messages.push_back(body);
		Ok(())
	}

	async fn receive(&self, max: usize) -> Result<Vec<QueueRecord>, QueueError> {
		let mut messages = self.messages.lock().await;
		let take = max.min(messages.len());
		Ok(messages
			.drain(..take)
			.map(|body| QueueRecord { body })
			.collect())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryQueueSchema)
	}
}

/// Configuration schema for MemoryQueue.
pub struct MemoryQueueSchema;

impl ConfigSchema for MemoryQueueSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory queue has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry for the memory queue implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::QueueFactory;

	fn factory() -> Self::Factory {
		create_queue
	}
}

impl crate::QueueRegistry for Registry {}

/// Factory function to create a memory queue backend from configuration.
///
/// Configuration parameters:
/// - None required for the memory queue
pub fn create_queue(_config: &toml::Value) -> Result<Box<dyn QueueInterface>, QueueError> {
	Ok(Box::new(MemoryQueue::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn delivers_in_fifo_order() {
		let queue = MemoryQueue::new();

		queue.send("first".into()).await.unwrap();
		queue.send("second".into()).await.unwrap();

		let records = queue.receive(10).await.unwrap();
		let bodies: Vec<_> = records.iter().map(|r| r.body.as_str()).collect();
		assert_eq!(bodies, vec!["first", "second"]);
	}

	#[tokio::test]
	async fn receive_respects_max() {
		let queue = MemoryQueue::new();

		for i in 0..5 {
			queue.send(format!("m{}", i)).await.unwrap();
		}

		let first = queue.receive(2).await.unwrap();
		assert_eq!(first.len(), 2);
		assert_eq!(queue.len().await, 3);

		let rest = queue.receive(10).await.unwrap();
		assert_eq!(rest.len(), 3);
		assert!(queue.is_empty().await);
	}

	#[tokio::test]
	async fn empty_queue_returns_no_records() {
		let queue = MemoryQueue::new();
		assert!(queue.receive(10).await.unwrap().is_empty());
	}
}
