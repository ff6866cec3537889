//! Chain profile loading and validation.
//!
//! Each JSON file under `config/chains` holds one [`ChainProfile`].

use async_trait::async_trait;
use std::{collections::HashMap, path::Path};
use url::Url;

use crate::{
	models::{
		config::{read_json, require_non_empty, sorted_json_files},
		ChainProfile, ConfigError, ConfigLoader,
	},
	utils::normalize_identifier,
};

#[async_trait]
impl ConfigLoader for ChainProfile {
	async fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let chain_dir = path.unwrap_or(Path::new("config/chains"));
		let mut pairs: Vec<(String, ChainProfile)> = Vec::new();

		for file_path in sorted_json_files(chain_dir, "chains")? {
			let chain = Self::load_from_path(&file_path).await?;

			let existing: Vec<&ChainProfile> = pairs.iter().map(|(_, c)| c).collect();
			Self::validate_uniqueness(&existing, &chain, &file_path.display().to_string())?;

			pairs.push((chain.id.clone(), chain));
		}

		Ok(T::from_iter(pairs))
	}

	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let chain: ChainProfile = read_json(path, "chain")?;
		chain.validate()?;
		Ok(chain)
	}

	/// Ensures that:
	/// - id, name and native token symbol are present
	/// - the RPC URL is an absolute http(s) URL
	/// - the explorer URL, when set, parses
	fn validate(&self) -> Result<(), ConfigError> {
		require_non_empty(&self.id, "Chain id")?;
		require_non_empty(&self.name, "Chain name")?;
		require_non_empty(&self.native_token.symbol, "Native token symbol")?;

		let rpc_url = Url::parse(&self.rpc_url).map_err(|e| {
			ConfigError::validation_error(
				format!("Chain '{}' has an invalid RPC URL: {}", self.id, e),
				Some(Box::new(e)),
				None,
			)
		})?;
		if !matches!(rpc_url.scheme(), "http" | "https") {
			return Err(ConfigError::validation_error(
				format!("Chain '{}' RPC URL must start with http:// or https://", self.id),
				None,
				None,
			));
		}

		if let Some(explorer_url) = &self.explorer_url {
			Url::parse(explorer_url).map_err(|e| {
				ConfigError::validation_error(
					format!("Chain '{}' has an invalid explorer URL: {}", self.id, e),
					Some(Box::new(e)),
					None,
				)
			})?;
		}

		self.validate_protocol();
		Ok(())
	}

	fn validate_protocol(&self) {
		if self.rpc_url.starts_with("http://") {
			tracing::warn!("Chain '{}' uses an insecure RPC URL: {}", self.id, self.rpc_url);
		}
	}

	fn validate_uniqueness(
		instances: &[&Self],
		current_instance: &Self,
		file_path: &str,
	) -> Result<(), ConfigError> {
		if instances
			.iter()
			.any(|existing| normalize_identifier(&existing.id) == normalize_identifier(&current_instance.id))
		{
			return Err(ConfigError::validation_error(
				format!("Duplicate chain id found: '{}'", current_instance.id),
				None,
				Some(HashMap::from([
					("chain_id".to_string(), current_instance.id.clone()),
					("path".to_string(), file_path.to_string()),
				])),
			));
		}
		Ok(())
	}
}
