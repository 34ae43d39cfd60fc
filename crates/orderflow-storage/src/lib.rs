//! Order store module for the orderflow pipeline.
//!
//! This module provides abstractions for persisting order records,
//! supporting different backend implementations such as in-memory or
//! file-based storage.

use async_trait::async_trait;
use orderflow_types::{ConfigSchema, ImplementationRegistry};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested record is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// hold order records. It provides basic key-value operations over raw
/// bytes; typed access lives in [`StorageService`].
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, overwriting any prior value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// storage implementations must provide a StorageFactory.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations, used when wiring the configured backend.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level order store that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and a logical table
/// name, providing convenient methods for storing and retrieving typed
/// records with automatic serialization/deserialization. Keys are formed as
/// `<table>:<id>`.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
	/// Logical table name records are namespaced under.
	table: String,
}

impl StorageService {
	/// Creates a new StorageService over the specified backend and table.
	pub fn new(backend: Box<dyn StorageInterface>, table: impl Into<String>) -> Self {
		Self {
			backend,
			table: table.into(),
		}
	}

	/// Returns the logical table name this service writes to.
	pub fn table(&self) -> &str {
		&self.table
	}

	fn key(&self, id: &str) -> String {
		format!("{}:{}", self.table, id)
	}

	/// Stores a serializable record under the given id.
	///
	/// Creates the record or overwrites an existing one.
	pub async fn store<T: Serialize>(&self, id: &str, data: &T) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&self.key(id), bytes).await
	}

	/// Retrieves and deserializes a record by id.
	pub async fn retrieve<T: DeserializeOwned>(&self, id: &str) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&self.key(id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Updates an existing record.
	///
	/// This method first checks if the record exists, then overwrites it.
	/// Returns `NotFound` if the record doesn't exist, making it
	/// semantically different from store() which will create or overwrite.
	pub async fn update<T: Serialize>(&self, id: &str, data: &T) -> Result<(), StorageError> {
		let key = self.key(id);

		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}

		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Removes a record from storage.
	pub async fn remove(&self, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&self.key(id)).await
	}

	/// Checks if a record exists.
	pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&self.key(id)).await
	}
}
