//! Configuration loading and validation.
//!
//! This module provides the loader trait and its implementations for chain
//! profiles, watched accounts, alert rules and the indexer settings file.

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

mod account_config;
mod alert_config;
mod chain_config;
mod error;
mod indexer_config;

pub use alert_config::AlertRuleFile;
pub use error::ConfigError;
pub use indexer_config::INDEXER_CONFIG_FILE;

/// Common interface for loading configuration files
#[async_trait]
pub trait ConfigLoader: Sized {
	/// Load all configuration files from a directory
	///
	/// If no path is provided, uses the default config directory.
	async fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>;

	/// Load configuration from a specific file path
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Validate the configuration
	fn validate(&self) -> Result<(), ConfigError>;

	/// Log a warning for insecure settings that are still accepted
	fn validate_protocol(&self) {}

	/// Check if a file is a JSON file based on extension
	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}

	/// Validate uniqueness of the configuration
	///
	/// Returns an error naming `file_path` if `current_instance` collides with one
	/// of `instances`.
	fn validate_uniqueness(
		instances: &[&Self],
		current_instance: &Self,
		file_path: &str,
	) -> Result<(), ConfigError>;
}

fn path_metadata(path: &Path) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"path".to_string(),
		path.display().to_string(),
	)]))
}

/// Lists the JSON files of `dir` in lexicographic order.
///
/// The order is part of the contract: alert rules are matched first-wins, so
/// their load order must not depend on the filesystem.
pub(crate) fn sorted_json_files(dir: &Path, kind: &str) -> Result<Vec<PathBuf>, ConfigError> {
	if !dir.exists() {
		return Err(ConfigError::file_error(
			format!("{} directory not found", kind),
			None,
			path_metadata(dir),
		));
	}

	let entries = std::fs::read_dir(dir).map_err(|e| {
		ConfigError::file_error(
			format!("failed to read {} directory: {}", kind, e),
			Some(Box::new(e)),
			path_metadata(dir),
		)
	})?;

	let mut files = Vec::new();
	for entry in entries {
		let entry = entry.map_err(|e| {
			ConfigError::file_error(
				format!("failed to read directory entry: {}", e),
				Some(Box::new(e)),
				path_metadata(dir),
			)
		})?;
		let path = entry.path();
		if path
			.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
		{
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}

/// Reads and deserializes one JSON file.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
	path: &Path,
	kind: &str,
) -> Result<T, ConfigError> {
	let file = std::fs::File::open(path).map_err(|e| {
		ConfigError::file_error(
			format!("failed to open {} config file: {}", kind, e),
			Some(Box::new(e)),
			path_metadata(path),
		)
	})?;
	serde_json::from_reader(file).map_err(|e| {
		ConfigError::parse_error(
			format!("failed to parse {} config: {}", kind, e),
			Some(Box::new(e)),
			path_metadata(path),
		)
	})
}

/// Fails with a validation error when `value` is blank.
pub(crate) fn require_non_empty(value: &str, what: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() {
		return Err(ConfigError::validation_error(
			format!("{} is required", what),
			None,
			None,
		));
	}
	Ok(())
}
