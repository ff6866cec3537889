//! Indexer settings file.
//!
//! `indexer.json` is optional. A missing file yields [`IndexerConfig::default`],
//! a present file may set any subset of the fields.

use std::path::Path;

use crate::models::{
	config::{path_metadata, read_json},
	ConfigError, IndexerConfig,
};

/// File name of the indexer settings inside the configuration directory
pub const INDEXER_CONFIG_FILE: &str = "indexer.json";

impl IndexerConfig {
	/// Loads `indexer.json` from `config_dir`, falling back to defaults when absent.
	pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
		let path = config_dir.join(INDEXER_CONFIG_FILE);
		if !path.exists() {
			tracing::debug!(
				"No {} found in {}, using defaults",
				INDEXER_CONFIG_FILE,
				config_dir.display()
			);
			return Ok(Self::default());
		}

		let config: IndexerConfig = read_json(&path, "indexer")?;
		config.validate().map_err(|e| {
			ConfigError::validation_error(
				format!("Validation failed for indexer settings: {}", e),
				Some(Box::new(e)),
				path_metadata(&path),
			)
		})?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.sync_interval_ms == 0 {
			return Err(ConfigError::validation_error(
				"sync_interval_ms must be greater than 0",
				None,
				None,
			));
		}

		if !self.default_threshold_percent.is_finite() || self.default_threshold_percent < 0.0 {
			return Err(ConfigError::validation_error(
				format!(
					"default_threshold_percent must be a non-negative number, got {}",
					self.default_threshold_percent
				),
				None,
				None,
			));
		}

		if self.max_concurrent_snapshots == 0 {
			return Err(ConfigError::validation_error(
				"max_concurrent_snapshots must be at least 1",
				None,
				None,
			));
		}

		if self.history_capacity == 0 {
			return Err(ConfigError::validation_error(
				"history_capacity must be at least 1",
				None,
				None,
			));
		}

		Ok(())
	}
}
