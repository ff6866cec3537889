//! Alert rule loading and validation.
//!
//! Files under `config/alerts` hold either one rule or an array of rules. Files
//! are read in name order and rules keep their position inside each file, which
//! makes the resulting list order (the matcher's tie-break) reproducible.

use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::HashMap, path::Path};

use crate::models::{
	config::{read_json, require_non_empty, sorted_json_files},
	AlertDirection, AlertRule, AlertType, ConfigError, ConfigLoader,
};

/// File structure for alert rule configuration files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AlertRuleFile {
	Many(Vec<AlertRule>),
	One(AlertRule),
}

impl AlertRuleFile {
	fn into_rules(self) -> Vec<AlertRule> {
		match self {
			Self::Many(rules) => rules,
			Self::One(rule) => vec![rule],
		}
	}
}

#[async_trait]
impl ConfigLoader for AlertRule {
	async fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let alert_dir = path.unwrap_or(Path::new("config/alerts"));
		let mut pairs: Vec<(String, AlertRule)> = Vec::new();

		for file_path in sorted_json_files(alert_dir, "alerts")? {
			let file: AlertRuleFile = read_json(&file_path, "alert")?;

			for rule in file.into_rules() {
				if let Err(validation_error) = rule.validate() {
					return Err(ConfigError::validation_error(
						format!(
							"Validation failed for alert rule '{}': {}",
							rule.id, validation_error
						),
						Some(Box::new(validation_error)),
						Some(HashMap::from([
							("path".to_string(), file_path.display().to_string()),
							("rule_id".to_string(), rule.id.clone()),
						])),
					));
				}

				let existing: Vec<&AlertRule> = pairs.iter().map(|(_, r)| r).collect();
				Self::validate_uniqueness(&existing, &rule, &file_path.display().to_string())?;

				pairs.push((rule.id.clone(), rule));
			}
		}

		Ok(T::from_iter(pairs))
	}

	/// Loads a file that holds exactly one rule, either bare or as a one-element array.
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file: AlertRuleFile = read_json(path, "alert")?;
		let mut rules = file.into_rules();
		if rules.len() != 1 {
			return Err(ConfigError::validation_error(
				format!("expected exactly one alert rule, found {}", rules.len()),
				None,
				Some(HashMap::from([(
					"path".to_string(),
					path.display().to_string(),
				)])),
			));
		}
		let rule = rules.remove(0);
		rule.validate()?;
		Ok(rule)
	}

	/// Ensures that:
	/// - id and target wallet id are present
	/// - threshold and window are positive
	///
	/// Combinations that can never match are accepted with a warning.
	fn validate(&self) -> Result<(), ConfigError> {
		require_non_empty(&self.id, "Alert rule id")?;
		require_non_empty(&self.account_id, "Alert rule wallet id")?;

		if self.threshold.is_zero() {
			return Err(ConfigError::validation_error(
				"Alert rule threshold must be greater than 0",
				None,
				None,
			));
		}

		if self.window_minutes == 0 {
			return Err(ConfigError::validation_error(
				"Alert rule window_minutes must be greater than 0",
				None,
				None,
			));
		}

		match (self.rule_type, self.direction) {
			(AlertType::BalanceDrop, AlertDirection::Above)
			| (AlertType::BalanceIncrease, AlertDirection::Below) => {
				tracing::warn!(
					"Alert rule '{}' combines {:?} with direction {:?} and will never match",
					self.id,
					self.rule_type,
					self.direction
				);
			}
			(AlertType::Custom, _) => {
				tracing::warn!(
					"Alert rule '{}' is of type custom, which is never matched",
					self.id
				);
			}
			_ => {}
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
				format!("Duplicate alert rule id found: '{}'", current_instance.id),
				None,
				Some(HashMap::from([
					("rule_id".to_string(), current_instance.id.clone()),
					("path".to_string(), file_path.to_string()),
				])),
			));
		}
		Ok(())
	}
}
