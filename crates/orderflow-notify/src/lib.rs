//! Notification channel module for the orderflow pipeline.
//!
//! This module provides abstractions for publishing completion events to
//! subscribers outside the pipeline. Messages are fire-and-forget: nothing
//! is retained after a successful publish.

use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry};
use serde::Serialize;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod memory;
}

/// Errors that can occur during notification operations.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// Error that occurs during serialization of a payload.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the channel backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for notification backends.
#[async_trait]
pub trait NotifyInterface: Send + Sync {
	/// Publishes a message body with a subject line.
	async fn publish(&self, subject: &str, body: String) -> Result<(), NotifyError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for notify factory functions.
pub type NotifyFactory = fn(&toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError>;

/// Registry trait for notify implementations.
pub trait NotifyRegistry: ImplementationRegistry<Factory = NotifyFactory> {}

/// Get all registered notify implementations.
pub fn get_all_implementations() -> Vec<(&'static str, NotifyFactory)> {
	use implementations::{log, memory};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level notification service that provides typed publishes.
///
/// The NotifyService wraps a low-level channel backend, serializing
/// payloads to JSON before they are published.
pub struct NotifyService {
	/// The underlying channel backend implementation.
	backend: Box<dyn NotifyInterface>,
}

impl NotifyService {
	/// Creates a new NotifyService with the specified backend.
	pub fn new(backend: Box<dyn NotifyInterface>) -> Self {
		Self { backend }
	}

	/// Serializes a payload to JSON and publishes it under the subject.
	pub async fn publish<T: Serialize>(
		&self,
		subject: &str,
		payload: &T,
	) -> Result<(), NotifyError> {
		let body = serde_json::to_string(payload)
			.map_err(|e| NotifyError::Serialization(e.to_string()))?;
		self.backend.publish(subject, body).await
	}
}

#[cfg(test)]
mod tests {
	use super::implementations::memory::MemoryNotifier;
	use super::*;
	use orderflow_types::{Notification, OrderStatus};

	#[tokio::test]
	async fn typed_publish_produces_json_body() {
		let notifier = MemoryNotifier::new();
		let published = notifier.handle();
		let service = NotifyService::new(Box::new(notifier));

		service
			.publish(
				"Order processed",
				&Notification {
					order_id: "abc".into(),
					status: OrderStatus::Completed,
				},
			)
			.await
			.unwrap();

		let messages = published.lock().await;
		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].subject, "Order processed");

		let body: Notification = serde_json::from_str(&messages[0].body).unwrap();
		assert_eq!(body.status, OrderStatus::Completed);
	}
}
