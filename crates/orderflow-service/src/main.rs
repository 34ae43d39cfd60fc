//! Main entry point for the orderflow service.
//!
//! This binary wires the configured storage, queue, and notification
//! backends into the intake and processing handlers, then runs the HTTP
//! intake surface and the queue-draining worker side by side until
//! interrupted.

use clap::Parser;
use orderflow_config::Config;
use orderflow_core::{IntakeHandler, OrderStateMachine, ProcessHandler};
use orderflow_notify::NotifyService;
use orderflow_queue::QueueService;
use orderflow_storage::StorageService;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;
mod worker;

/// Command-line arguments for the orderflow service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the orderflow service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the handlers over the configured backends
/// 5. Runs the worker (and the API server, when enabled) until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started orderflow");

	// Load configuration
	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.pipeline.id);

	let (storage, queue, notify) = build_backends(&config)?;

	let state = Arc::new(OrderStateMachine::new(storage));
	let intake = Arc::new(IntakeHandler::new(Arc::clone(&state), Arc::clone(&queue)));
	let processor = Arc::new(ProcessHandler::new(Arc::clone(&state), notify));

	let worker_task = worker::run(Arc::clone(&queue), processor, config.worker.clone());

	let api_enabled = config.api.as_ref().is_some_and(|api| api.enabled);

	if api_enabled {
		let api_config = config.api.clone().ok_or("api config missing")?;
		let api_task = server::start_server(api_config, intake, state);

		tokio::select! {
			result = worker_task => {
				tracing::info!("Worker finished");
				result?;
			}
			result = api_task => {
				tracing::info!("API server finished");
				result?;
			}
			_ = tokio::signal::ctrl_c() => {
				tracing::info!("Shutdown signal received");
			}
		}
	} else {
		tracing::info!("Starting worker only");
		tokio::select! {
			result = worker_task => {
				result?;
			}
			_ = tokio::signal::ctrl_c() => {
				tracing::info!("Shutdown signal received");
			}
		}
	}

	tracing::info!("Stopped orderflow");
	Ok(())
}

/// Builds the storage, queue, and notify services from configuration.
///
/// For each section, the primary implementation's factory is looked up in
/// that crate's registry, the implementation-specific table is validated
/// against the backend's own schema, and the backend is wrapped in its
/// typed service.
fn build_backends(
	config: &Config,
) -> Result<
	(Arc<StorageService>, Arc<QueueService>, Arc<NotifyService>),
	Box<dyn std::error::Error>,
> {
	let storage_impl_config = implementation_config(
		&config.storage.implementations,
		&config.storage.primary,
		"storage",
	)?;
	let storage_factories: HashMap<_, _> =
		orderflow_storage::get_all_implementations().into_iter().collect();
	let storage_factory = storage_factories
		.get(config.storage.primary.as_str())
		.ok_or_else(|| format!("unknown storage implementation '{}'", config.storage.primary))?;
	let storage_backend = storage_factory(&storage_impl_config)?;
	storage_backend
		.config_schema()
		.validate(&storage_impl_config)?;
	let storage = Arc::new(StorageService::new(
		storage_backend,
		config.storage.table.clone(),
	));

	let queue_impl_config =
		implementation_config(&config.queue.implementations, &config.queue.primary, "queue")?;
	let queue_factories: HashMap<_, _> =
		orderflow_queue::get_all_implementations().into_iter().collect();
	let queue_factory = queue_factories
		.get(config.queue.primary.as_str())
		.ok_or_else(|| format!("unknown queue implementation '{}'", config.queue.primary))?;
	let queue_backend = queue_factory(&queue_impl_config)?;
	queue_backend.config_schema().validate(&queue_impl_config)?;
	let queue = Arc::new(QueueService::new(queue_backend));

	let notify_impl_config = implementation_config(
		&config.notify.implementations,
		&config.notify.primary,
		"notify",
	)?;
	let notify_factories: HashMap<_, _> =
		orderflow_notify::get_all_implementations().into_iter().collect();
	let notify_factory = notify_factories
		.get(config.notify.primary.as_str())
		.ok_or_else(|| format!("unknown notify implementation '{}'", config.notify.primary))?;
	let notify_backend = notify_factory(&notify_impl_config)?;
	notify_backend
		.config_schema()
		.validate(&notify_impl_config)?;
	let notify = Arc::new(NotifyService::new(notify_backend));

	Ok((storage, queue, notify))
}

/// Fetches the configuration table for a section's primary implementation.
fn implementation_config(
	implementations: &HashMap<String, toml::Value>,
	primary: &str,
	section: &str,
) -> Result<toml::Value, Box<dyn std::error::Error>> {
	implementations
		.get(primary)
		.cloned()
		.ok_or_else(|| format!("{}.implementations.{} is not configured", section, primary).into())
}
