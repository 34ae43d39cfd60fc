//! Test doubles for the collaborator seams.
//!
//! Hand-written implementations of the backend traits used to observe
//! writes and inject failures in handler tests.

use async_trait::async_trait;
use orderflow_notify::{NotifyError, NotifyInterface};
use orderflow_queue::{QueueError, QueueInterface, QueueRecord};
use orderflow_storage::implementations::memory::MemoryStorage;
use orderflow_storage::{StorageError, StorageInterface};
use orderflow_types::{ConfigSchema, Schema, ValidationError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Schema accepted by every double.
pub struct NullSchema;

impl ConfigSchema for NullSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Storage double that records every write while delegating to a real
/// in-memory backend.
#[derive(Clone)]
pub struct RecordingStorage {
	inner: MemoryStorage,
	pub writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingStorage {
	pub fn new() -> Self {
		Self {
			inner: MemoryStorage::new(),
			writes: Arc::new(Mutex::new(Vec::new())),
		}
	}
}

#[async_trait]
impl StorageInterface for RecordingStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.inner.get_bytes(key).await
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		self.writes.lock().await.push(value.clone());
		self.inner.set_bytes(key, value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.inner.delete(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		self.inner.exists(key).await
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(NullSchema)
	}
}

/// Storage double whose writes always fail.
pub struct FailingStorage;

#[async_trait]
impl StorageInterface for FailingStorage {
	async fn get_bytes(&self, _key: &str) -> Result<Vec<u8>, StorageError> {
		Err(StorageError::Backend("store offline".into()))
	}

	async fn set_bytes(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
		Err(StorageError::Backend("store offline".into()))
	}

	async fn delete(&self, _key: &str) -> Result<(), StorageError> {
		Err(StorageError::Backend("store offline".into()))
	}

	async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
		Err(StorageError::Backend("store offline".into()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(NullSchema)
	}
}

/// Queue double whose sends always fail.
pub struct FailingQueue;

#[async_trait]
impl QueueInterface for FailingQueue {
	async fn send(&self, _body: String) -> Result<(), QueueError> {
		Err(QueueError::Backend("queue unreachable".into()))
	}

	async fn receive(&self, _max: usize) -> Result<Vec<QueueRecord>, QueueError> {
		Err(QueueError::Backend("queue unreachable".into()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(NullSchema)
	}
}

/// Notifier double whose publishes always fail.
pub struct FailingNotifier;

#[async_trait]
impl NotifyInterface for FailingNotifier {
	async fn publish(&self, _subject: &str, _body: String) -> Result<(), NotifyError> {
		Err(NotifyError::Backend("channel unreachable".into()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(NullSchema)
	}
}
