use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::models::core::amount::decimal_amount;

/// A condition that turns a significant balance movement into an alert.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AlertRule {
	/// Unique rule identifier
	pub id: String,

	/// Account the rule applies to
	#[serde(alias = "wallet_id")]
	pub account_id: String,

	/// Kind of movement the rule looks for
	#[serde(rename = "type")]
	pub rule_type: AlertType,

	/// Direction of the movement relative to the threshold
	pub direction: AlertDirection,

	/// Minimum movement size in the chain's smallest unit
	#[serde(with = "decimal_amount")]
	pub threshold: U256,

	/// Evaluation window in minutes. Carried as metadata only: rules are
	/// matched against the delta between two consecutive snapshots.
	pub window_minutes: u32,

	/// Disabled rules are never matched
	#[serde(default = "default_enabled")]
	pub enabled: bool,

	/// Where a triggered alert should be delivered
	pub channel: AlertChannel,
}

fn default_enabled() -> bool {
	true
}

/// Supported alert rule kinds
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
	/// Balance decreased by at least the threshold
	BalanceDrop,
	/// Balance increased by at least the threshold
	BalanceIncrease,
	/// Balance moved by at least the threshold in either direction
	#[serde(rename = "large-tx", alias = "large-transaction")]
	LargeTransaction,
	/// Reserved for user-defined logic; never matches
	Custom,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
	Above,
	Below,
}

/// Delivery channel for triggered alerts
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AlertChannel {
	InApp,
	Webhook,
	Email,
}

impl AlertChannel {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::InApp => "in-app",
			Self::Webhook => "webhook",
			Self::Email => "email",
		}
	}
}
