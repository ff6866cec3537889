//! Treasury indexer entry point.
//!
//! This binary loads the configuration directory, registers the configured
//! wallets, runs the periodic sync loop and logs every indexer event until it
//! receives an interrupt signal.
//!
//! # Flow
//! 1. Loads chains, wallets, alert rules and indexer settings
//! 2. Builds the indexer and registers the wallets
//! 3. Starts the event subscriber and, if enabled, the metrics server
//! 4. Runs sync passes on the configured interval
//! 5. Handles graceful shutdown on Ctrl+C

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

use crate::{
	bootstrap::{
		initialize_services, load_configuration, spawn_event_logger, warn_unsupported_wallets,
		Result,
	},
	services::balance::EvmBalanceSource,
	utils::{
		logging::setup_logging, metrics::server::create_metrics_server, parse_string_to_bytes_size,
	},
};

use clap::Parser;
use dotenvy::dotenv_override;
use std::env::{set_var, var};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Time the event subscriber gets to drain after shutdown
const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(
	name = "treasury-indexer",
	about = "Samples treasury wallet balances across chains and reports significant movements and alerts.",
	version
)]
struct Cli {
	/// Write logs to file instead of stdout
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_size: Option<u64>,

	/// Address to start the metrics server on (default: 127.0.0.1:8081)
	#[arg(long, value_name = "HOST:PORT")]
	metrics_address: Option<String>,

	/// Enable metrics server
	#[arg(long)]
	metrics: bool,

	/// Configuration directory (default: config/)
	#[arg(long, value_name = "PATH")]
	config_dir: Option<PathBuf>,

	/// Override the interval between sync passes
	#[arg(long, value_name = "MILLISECONDS")]
	sync_interval_ms: Option<u64>,

	/// Validate configuration files without starting the service
	#[arg(long)]
	check: bool,

	/// Run a single sync pass and exit
	#[arg(long)]
	once: bool,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		// Reload environment variables from .env file
		// Override any existing environment variables
		dotenv_override().ok();

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		// Set log level from RUST_LOG if it exists
		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}

		if self.metrics {
			set_var("METRICS_ENABLED", "true");
		}

		if let Some(address) = &self.metrics_address {
			if let Some((_, port)) = address.rsplit_once(':') {
				set_var("METRICS_PORT", port);
			}
		}
	}

	fn config_dir(&self) -> PathBuf {
		self.config_dir
			.clone()
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
	}

	fn metrics_address(&self) -> String {
		if var("IN_DOCKER").unwrap_or_default() == "true" {
			var("METRICS_PORT")
				.map(|port| format!("0.0.0.0:{}", port))
				.unwrap_or_else(|_| "0.0.0.0:8081".to_string())
		} else {
			self.metrics_address
				.clone()
				.unwrap_or_else(|| "127.0.0.1:8081".to_string())
		}
	}
}

/// Main entry point for the treasury indexer.
///
/// # Errors
/// Returns an error if configuration or service initialization fails, or if a
/// `--once` pass fails as a whole.
#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	cli.apply_to_env();

	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	let config_dir = cli.config_dir();

	if cli.check {
		validate_configuration(&config_dir).await;
		return Ok(());
	}

	let mut configuration = load_configuration(&config_dir).await.map_err(|e| {
		anyhow::anyhow!(
			"Failed to load configuration from {}: {}",
			config_dir.display(),
			e
		)
	})?;
	if let Some(interval_ms) = cli.sync_interval_ms {
		configuration.settings.sync_interval_ms = interval_ms;
	}

	let (indexer, receiver) = initialize_services(&configuration)
		.await
		.map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;
	let event_logger = spawn_event_logger(receiver);

	if cli.once {
		let result = indexer.sync_all().await;
		drop(indexer);
		drain_events(event_logger).await;

		let snapshots = result?;
		info!("Single sync pass complete with {} snapshot(s)", snapshots.len());
		return Ok(());
	}

	let metrics_enabled =
		cli.metrics || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);

	let metrics_server = if metrics_enabled {
		let metrics_address = cli.metrics_address();
		info!("Metrics server enabled, starting on {}", metrics_address);

		match create_metrics_server(metrics_address, indexer.clone()) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	indexer.start(None);
	info!("Service started. Press Ctrl+C to shutdown");

	let ctrl_c = tokio::signal::ctrl_c();

	if let Some(metrics_future) = metrics_server {
		tokio::select! {
			result = ctrl_c => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping services...");
			}
			result = metrics_future => {
				if let Err(e) = result {
					error!("Metrics server error: {}", e);
				}
				info!("Metrics server stopped, shutting down services...");
			}
		}
	} else {
		let _ = ctrl_c.await;
		info!("Shutdown signal received, stopping services...");
	}

	indexer.stop();
	drop(indexer);
	drain_events(event_logger).await;

	info!("Shutdown complete");
	Ok(())
}

/// Waits for the event subscriber to flush what is already queued.
async fn drain_events(event_logger: JoinHandle<()>) {
	if tokio::time::timeout(EVENT_DRAIN_TIMEOUT, event_logger)
		.await
		.is_err()
	{
		warn!("Event subscriber did not finish within {:?}", EVENT_DRAIN_TIMEOUT);
	}
}

/// Validates configuration files and their structure
async fn validate_configuration(config_dir: &Path) {
	info!("Validating configuration in {}...", config_dir.display());

	match load_configuration(config_dir).await {
		Ok(configuration) => {
			info!("✓ Found {} chain profile(s)", configuration.chains.len());

			if configuration.wallets.is_empty() {
				error!(
					"No wallets configured. Add wallet files under {}",
					config_dir.join("wallets").display()
				);
				return;
			}
			info!("✓ Found {} wallet(s)", configuration.wallets.len());
			match EvmBalanceSource::new(configuration.chains.clone()) {
				Ok(source) => {
					let unsupported = warn_unsupported_wallets(&configuration.wallets, &source);
					if unsupported > 0 {
						warn!("{} wallet(s) cannot be sampled by the EVM balance source", unsupported);
					}
				}
				Err(e) => error!("Failed to build balance source: {}", e),
			}
			info!("✓ Found {} alert rule(s)", configuration.alert_rules.len());
			info!(
				"✓ Sync interval {} ms, threshold {}%",
				configuration.settings.sync_interval_ms,
				configuration.settings.default_threshold_percent
			);

			info!("Configuration validation completed successfully!");
		}
		Err(e) => {
			error!("{}", e);
		}
	}
}
