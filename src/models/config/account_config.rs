//! Watched account loading and validation.
//!
//! Each JSON file under `config/wallets` holds one [`WatchedAccount`]. References
//! to chain profiles are checked later, by the account configuration repository.

use async_trait::async_trait;
use std::{collections::HashMap, path::Path};

use crate::{
	models::{
		config::{read_json, require_non_empty, sorted_json_files},
		ConfigError, ConfigLoader, WatchedAccount,
	},
	utils::normalize_identifier,
};

#[async_trait]
impl ConfigLoader for WatchedAccount {
	async fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let wallet_dir = path.unwrap_or(Path::new("config/wallets"));
		let mut pairs: Vec<(String, WatchedAccount)> = Vec::new();

		for file_path in sorted_json_files(wallet_dir, "wallets")? {
			let account = Self::load_from_path(&file_path).await?;

			let existing: Vec<&WatchedAccount> = pairs.iter().map(|(_, a)| a).collect();
			Self::validate_uniqueness(&existing, &account, &file_path.display().to_string())?;

			pairs.push((account.id.clone(), account));
		}

		Ok(T::from_iter(pairs))
	}

	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let account: WatchedAccount = read_json(path, "wallet")?;
		account.validate()?;
		Ok(account)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		require_non_empty(&self.id, "Wallet id")?;
		require_non_empty(&self.label, "Wallet label")?;
		require_non_empty(&self.address, "Wallet address")?;
		require_non_empty(&self.chain_id, "Wallet chain id")?;

		if self.tags.iter().any(|tag| tag.trim().is_empty()) {
			return Err(ConfigError::validation_error(
				format!("Wallet '{}' has an empty tag", self.id),
				None,
				None,
			));
		}

		Ok(())
	}

	fn validate_uniqueness(
		instances: &[&Self],
		current_instance: &Self,
		file_path: &str,
	) -> Result<(), ConfigError> {
		if instances.iter().any(|existing| existing.id == current_instance.id) {
			return Err(ConfigError::validation_error(
				format!("Duplicate wallet id found: '{}'", current_instance.id),
				None,
				Some(HashMap::from([
					("wallet_id".to_string(), current_instance.id.clone()),
					("path".to_string(), file_path.to_string()),
				])),
			));
		}

		let same_address = instances.iter().find(|existing| {
			existing.chain_id == current_instance.chain_id
				&& normalize_identifier(&existing.address) == normalize_identifier(&current_instance.address)
		});
		if let Some(existing) = same_address {
			tracing::warn!(
				"Wallets '{}' and '{}' watch the same address on chain '{}'",
				existing.id,
				current_instance.id,
				current_instance.chain_id
			);
		}

		Ok(())
	}
}
