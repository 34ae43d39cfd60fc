//! Configuration module for the orderflow pipeline.
//!
//! This module provides structures and utilities for managing pipeline
//! configuration. It supports loading configuration from TOML files, with
//! `${ENV_VAR}` and `${ENV_VAR:-default}` substitution so deployment
//! environments can inject the store table name, queue address, and
//! notification channel address without editing the file.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the orderflow pipeline.
///
/// Contains all sections required for the pipeline to operate: instance
/// identity, the order store, the work queue, the notification channel,
/// the HTTP API server, and the worker loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this pipeline instance.
	pub pipeline: PipelineConfig,
	/// Configuration for the order store backend.
	pub storage: StorageConfig,
	/// Configuration for the work queue backend.
	pub queue: QueueConfig,
	/// Configuration for the notification channel backend.
	pub notify: NotifyConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
	/// Configuration for the queue-draining worker.
	#[serde(default)]
	pub worker: WorkerConfig,
}

/// Configuration specific to this pipeline instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
	/// Unique identifier for this pipeline instance.
	pub id: String,
}

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Logical table name orders are stored under.
	#[serde(default = "default_table")]
	pub table: String,
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Returns the default order table name.
fn default_table() -> String {
	"Orders".to_string()
}

/// Configuration for the work queue backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of queue implementation names to their configurations.
	/// The queue address, when one is needed, lives in the
	/// implementation's own table.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the notification channel backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of notify implementation names to their configurations.
	/// The channel address (topic), when one is needed, lives in the
	/// implementation's own table.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Configuration for the queue-draining worker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
	/// Maximum number of queue records taken per drain.
	#[serde(default = "default_batch_size")]
	pub batch_size: usize,
	/// Sleep between polls when the queue is empty, in milliseconds.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

/// Returns the default worker batch size.
fn default_batch_size() -> usize {
	10
}

/// Returns the default worker poll interval in milliseconds.
fn default_poll_interval_ms() -> u64 {
	500
}

impl Default for WorkerConfig {
	fn default() -> Self {
		Self {
			batch_size: default_batch_size(),
			poll_interval_ms: default_poll_interval_ms(),
		}
	}
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment
	/// variable references before parsing.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates the configuration beyond what serde can express.
	///
	/// Each section's `primary` must name a configured implementation, and
	/// the table name must not be blank.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.storage.table.trim().is_empty() {
			return Err(ConfigError::Validation(
				"storage.table must not be empty".to_string(),
			));
		}

		check_primary("storage", &self.storage.primary, &self.storage.implementations)?;
		check_primary("queue", &self.queue.primary, &self.queue.implementations)?;
		check_primary("notify", &self.notify.primary, &self.notify.implementations)?;

		if self.worker.batch_size == 0 {
			return Err(ConfigError::Validation(
				"worker.batch_size must be at least 1".to_string(),
			));
		}

		Ok(())
	}
}

/// Checks that a section's primary implementation is actually configured.
fn check_primary(
	section: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
) -> Result<(), ConfigError> {
	if !implementations.contains_key(primary) {
		return Err(ConfigError::Validation(format!(
			"{}.primary '{}' has no matching entry in {}.implementations",
			section, primary, section
		)));
	}
	Ok(())
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Resolves `${VAR}` and `${VAR:-default}` references against the process
/// environment.
///
/// A reference without a default to a variable that is not set is an error;
/// a reference with a default silently falls back.
fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
		let var_name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' is not set",
						var_name
					)))
				},
			},
		};

		replacements.push((full_match, value));
	}

	for (pattern, value) in replacements {
		result = result.replace(&pattern, &value);
	}

	Ok(result)
}
