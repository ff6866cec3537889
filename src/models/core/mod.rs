//! Core domain models of the indexer.
//!
//! - Watched accounts and the chains they live on
//! - Balance snapshots and the deltas derived from them
//! - Alert rules matched against significant deltas
//! - Indexer settings

mod account;
mod alert;
mod amount;
mod chain;
mod indexer;
mod snapshot;

pub use account::{Importance, WatchedAccount};
pub use alert::{AlertChannel, AlertDirection, AlertRule, AlertType};
pub use amount::{decimal_amount, parse_amount, PercentageChange, SignedAmount};
pub use chain::{ChainCategory, ChainProfile, NativeToken};
pub use indexer::{
	IndexerConfig, DEFAULT_HISTORY_CAPACITY, DEFAULT_SYNC_INTERVAL_MS, DEFAULT_THRESHOLD_PERCENT,
};
pub use snapshot::{BalanceDelta, BalanceSnapshot};
