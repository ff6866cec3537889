use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::models::core::amount::{decimal_amount, PercentageChange, SignedAmount};

/// One timestamped balance observation of a watched account.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BalanceSnapshot {
	/// Owning account id
	pub account_id: String,

	/// Chain the balance was read from
	pub chain_id: String,

	/// Balance in the chain's smallest unit
	#[serde(with = "decimal_amount")]
	pub balance: U256,

	/// Observation time in milliseconds since the Unix epoch
	pub timestamp: i64,

	/// Block the balance was read at, when the source reports it
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub block_number: Option<u64>,

	/// Transaction that caused the balance, when known
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
}

/// Change between two consecutive snapshots of the same account.
///
/// Derived during movement evaluation and never stored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BalanceDelta {
	pub account_id: String,
	#[serde(with = "decimal_amount")]
	pub previous_balance: U256,
	#[serde(with = "decimal_amount")]
	pub current_balance: U256,
	pub delta: SignedAmount,
	pub percentage_change: PercentageChange,
	/// Timestamp of the newer snapshot
	pub timestamp: i64,
}

impl BalanceDelta {
	/// Builds the delta from `previous` to `current`.
	pub fn between(previous: &BalanceSnapshot, current: &BalanceSnapshot) -> Self {
		Self {
			account_id: current.account_id.clone(),
			previous_balance: previous.balance,
			current_balance: current.balance,
			delta: SignedAmount::difference(current.balance, previous.balance),
			percentage_change: PercentageChange::between(previous.balance, current.balance),
			timestamp: current.timestamp,
		}
	}
}
