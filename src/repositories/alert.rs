//! Alert rule configuration repository.
//!
//! Loads the ordered rule list and checks that each rule targets a configured
//! wallet. The resulting order is the matcher's tie-break.

#![allow(clippy::result_large_err)]

use std::{collections::HashMap, path::Path};

use crate::{
	models::{AlertRule, ConfigLoader, WatchedAccount},
	repositories::error::RepositoryError,
};

/// Alert rules read from configuration, in load order
#[derive(Clone, Debug, Default)]
pub struct AlertRuleRepository {
	pub rules: Vec<AlertRule>,
}

impl AlertRuleRepository {
	/// Loads every rule file and validates wallet references against `wallets`
	pub async fn new(
		path: Option<&Path>,
		wallets: &[WatchedAccount],
	) -> Result<Self, RepositoryError> {
		let pairs: Vec<(String, AlertRule)> = AlertRule::load_all(path).await.map_err(|e| {
			RepositoryError::load_error(
				"Failed to load alert rules",
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.map_or_else(|| "default".to_string(), |p| p.display().to_string()),
				)])),
			)
		})?;
		let rules: Vec<AlertRule> = pairs.into_iter().map(|(_, rule)| rule).collect();

		Self::validate_rule_references(&rules, wallets)?;
		Ok(Self { rules })
	}

	/// Returns an error if any rule targets a wallet that is not configured.
	pub fn validate_rule_references(
		rules: &[AlertRule],
		wallets: &[WatchedAccount],
	) -> Result<(), RepositoryError> {
		let mut validation_errors = Vec::new();
		let mut metadata = HashMap::new();

		for rule in rules {
			if !wallets.iter().any(|wallet| wallet.id == rule.account_id) {
				validation_errors.push(format!(
					"Alert rule '{}' references non-existent wallet '{}'",
					rule.id, rule.account_id
				));
				metadata.insert(
					format!("rule_{}_invalid_wallet", rule.id),
					rule.account_id.clone(),
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

	pub fn get_all(&self) -> Vec<AlertRule> {
		self.rules.clone()
	}
}
