//! Log-based notification backend.
//!
//! Publishes completion events as structured log lines. Useful for
//! development and for deployments where a downstream collector tails the
//! log stream instead of subscribing to a real channel.

use crate::{NotifyError, NotifyInterface};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use tracing::info;

/// Notification backend that writes publishes to the log.
pub struct LogNotifier {
	/// Topic name included in each log line, if configured.
	topic: Option<String>,
}

impl LogNotifier {
	/// Creates a new LogNotifier with an optional topic label.
	pub fn new(topic: Option<String>) -> Self {
		Self { topic }
	}
}

#[async_trait]
impl NotifyInterface for LogNotifier {
	async fn publish(&self, subject: &str, body: String) -> Result<(), NotifyError> {
		info!(
			target: "orderflow::notify",
			topic = self.topic.as_deref().unwrap_or("-"),
			subject,
			%body,
			"notification published"
		);
		Ok(())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotifierSchema)
	}
}

/// Configuration schema for LogNotifier.
pub struct LogNotifierSchema;

impl ConfigSchema for LogNotifierSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("topic", FieldType::String)]);
		schema.validate(config)
	}
}

/// Registry for the log notify implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = crate::NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifyRegistry for Registry {}

/// Factory function to create a log notification backend from configuration.
///
/// Configuration parameters:
/// - `topic`: channel label included in log lines (optional)
pub fn create_notifier(config: &toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError> {
	let topic = config
		.get("topic")
		.and_then(|v| v.as_str())
		.map(|s| s.to_string());

	Ok(Box::new(LogNotifier::new(topic)))
}
