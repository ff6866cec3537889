//! Wallet configuration repository.
//!
//! Loads the wallets to register at startup and checks that each one points at a
//! known chain profile.

#![allow(clippy::result_large_err)]

use std::{collections::HashMap, path::Path};

use crate::{
	models::{ChainProfile, ConfigLoader, WatchedAccount},
	repositories::{
		chain::{ChainRepositoryTrait, ChainService},
		error::RepositoryError,
	},
};

/// Wallets read from configuration, in file name order
#[derive(Clone, Debug, Default)]
pub struct WalletConfigRepository {
	pub wallets: Vec<WatchedAccount>,
}

impl WalletConfigRepository {
	/// Loads every wallet file and validates chain references against `chain_service`
	pub async fn new<C: ChainRepositoryTrait>(
		path: Option<&Path>,
		chain_service: &ChainService<C>,
	) -> Result<Self, RepositoryError> {
		let pairs: Vec<(String, WatchedAccount)> =
			WatchedAccount::load_all(path).await.map_err(|e| {
				RepositoryError::load_error(
					"Failed to load wallets",
					Some(Box::new(e)),
					Some(HashMap::from([(
						"path".to_string(),
						path.map_or_else(|| "default".to_string(), |p| p.display().to_string()),
					)])),
				)
			})?;
		let wallets: Vec<WatchedAccount> = pairs.into_iter().map(|(_, wallet)| wallet).collect();

		Self::validate_wallet_references(&wallets, &chain_service.get_all())?;
		Ok(Self { wallets })
	}

	/// Returns an error if any wallet references a chain that is not loaded.
	pub fn validate_wallet_references(
		wallets: &[WatchedAccount],
		chains: &HashMap<String, ChainProfile>,
	) -> Result<(), RepositoryError> {
		let mut validation_errors = Vec::new();
		let mut metadata = HashMap::new();

		for wallet in wallets {
			if !chains.contains_key(&wallet.chain_id) {
				validation_errors.push(format!(
					"Wallet '{}' references non-existent chain '{}'",
					wallet.id, wallet.chain_id
				));
				metadata.insert(
					format!("wallet_{}_invalid_chain", wallet.id),
					wallet.chain_id.clone(),
				);
			}
		}

		if !validation_errors.is_empty() {
			return Err(RepositoryError::validation_error(
				format!(
					"Configuration validation failed:\n{}",
					validation_errors.join("\n"),
				),
				None,
				Some(metadata),
			));
		}

		Ok(())
	}

	pub fn get(&self, wallet_id: &str) -> Option<WatchedAccount> {
		self.wallets.iter().find(|w| w.id == wallet_id).cloned()
	}

	pub fn get_all(&self) -> Vec<WatchedAccount> {
		self.wallets.clone()
	}
}
