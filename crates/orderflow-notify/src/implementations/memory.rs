//! In-memory notification backend.
//!
//! Retains published messages so tests can assert on what was published
//! and how many times.

use crate::{NotifyError, NotifyInterface};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A message captured by the memory notifier.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
	/// Subject line the message was published under.
	pub subject: String,
	/// Raw JSON body.
	pub body: String,
}

/// Notification backend that retains everything it publishes.
#[derive(Clone)]
pub struct MemoryNotifier {
	published: Arc<Mutex<Vec<PublishedMessage>>>,
}

impl MemoryNotifier {
	/// Creates a new MemoryNotifier instance.
	pub fn new() -> Self {
		Self {
			published: Arc::new(Mutex::new(Vec::new())),
		}
	}

	/// Returns a handle to the captured messages.
	///
	/// The handle stays valid after the notifier is boxed into a service,
	/// which is how tests observe publishes.
	pub fn handle(&self) -> Arc<Mutex<Vec<PublishedMessage>>> {
		Arc::clone(&self.published)
	}
}

impl Default for MemoryNotifier {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl NotifyInterface for MemoryNotifier {
	async fn publish(&self, subject: &str, body: String) -> Result<(), NotifyError> {
		let mut published = self.published.lock().await;
		published.push(PublishedMessage {
			subject: subject.to_string(),
			body,
		});
		Ok(())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryNotifierSchema)
	}
}

/// Configuration schema for MemoryNotifier.
pub struct MemoryNotifierSchema;

impl ConfigSchema for MemoryNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory notifier has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry for the memory notify implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifyRegistry for Registry {}

/// Factory function to create a memory notification backend.
///
/// Configuration parameters:
/// - None required for the memory notifier
pub fn create_notifier(_config: &toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError> {
	Ok(Box::new(MemoryNotifier::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn captures_published_messages() {
		let notifier = MemoryNotifier::new();
		let handle = notifier.handle();

		notifier
			.publish("Order processed", "{\"orderId\":\"a\"}".into())
			.await
			.unwrap();
		notifier
			.publish("Order processed", "{\"orderId\":\"b\"}".into())
			.await
			.unwrap();

		let messages = handle.lock().await;
		assert_eq!(messages.len(), 2);
		assert!(messages[1].body.contains("\"b\""));
	}
}
