use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::models::core::amount::decimal_amount;

/// Default interval between two sync passes
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 60_000;
/// Default relative change that makes a movement significant
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 5.0;
/// Default number of snapshots kept per account
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Orchestrator-level settings for sampling and significance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct IndexerConfig {
	/// Interval between scheduled sync passes
	pub sync_interval_ms: u64,

	/// A movement is significant when `|percentage change|` reaches this value
	pub default_threshold_percent: f64,

	/// A movement is also significant when `|delta|` reaches this amount
	#[serde(with = "decimal_amount")]
	pub min_absolute_change: U256,

	/// Upper bound of snapshot requests in flight during one pass
	pub max_concurrent_snapshots: usize,

	/// Number of snapshots retained per account
	pub history_capacity: usize,
}

impl Default for IndexerConfig {
	fn default() -> Self {
		Self {
			sync_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
			default_threshold_percent: DEFAULT_THRESHOLD_PERCENT,
			min_absolute_change: U256::ZERO,
			max_concurrent_snapshots: 1,
			history_capacity: DEFAULT_HISTORY_CAPACITY,
		}
	}
}
