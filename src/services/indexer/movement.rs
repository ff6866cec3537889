//! Movement evaluation between consecutive snapshots.

use alloy::primitives::U256;

use crate::models::{BalanceDelta, BalanceSnapshot, IndexerConfig};

/// Significance thresholds applied to every delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementThresholds {
	/// Inclusive bound on `|percentage change|`
	pub default_threshold_percent: f64,
	/// Inclusive bound on `|delta|`
	pub min_absolute_change: U256,
}

impl From<&IndexerConfig> for MovementThresholds {
	fn from(config: &IndexerConfig) -> Self {
		Self {
			default_threshold_percent: config.default_threshold_percent,
			min_absolute_change: config.min_absolute_change,
		}
	}
}

impl Default for MovementThresholds {
	fn default() -> Self {
		Self::from(&IndexerConfig::default())
	}
}

/// Delta from `previous` to `current`, or `None` when there is nothing to evaluate.
///
/// Snapshots of different accounts and unchanged balances yield `None`.
pub fn compute_delta(previous: &BalanceSnapshot, current: &BalanceSnapshot) -> Option<BalanceDelta> {
	if previous.account_id != current.account_id || previous.balance == current.balance {
		return None;
	}
	Some(BalanceDelta::between(previous, current))
}

/// Whether `delta` reaches either threshold.
///
/// A `min_absolute_change` of zero makes every non-zero delta significant.
pub fn is_significant(delta: &BalanceDelta, thresholds: &MovementThresholds) -> bool {
	delta
		.percentage_change
		.reaches(thresholds.default_threshold_percent)
		|| delta.delta.magnitude() >= thresholds.min_absolute_change
}
