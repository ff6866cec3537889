//! Domain models and data structures of the indexer.
//!
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (WatchedAccount, BalanceSnapshot, AlertRule, ChainProfile)

mod config;
mod core;

// Re-export core types
pub use core::{
	decimal_amount, parse_amount, AlertChannel, AlertDirection, AlertRule, AlertType,
	BalanceDelta, BalanceSnapshot, ChainCategory, ChainProfile, Importance, IndexerConfig,
	NativeToken, PercentageChange, SignedAmount, WatchedAccount, DEFAULT_HISTORY_CAPACITY,
	DEFAULT_SYNC_INTERVAL_MS, DEFAULT_THRESHOLD_PERCENT,
};

// Re-export config types
pub use config::{AlertRuleFile, ConfigError, ConfigLoader, INDEXER_CONFIG_FILE};
