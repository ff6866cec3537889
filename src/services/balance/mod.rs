//! Balance lookup.
//!
//! The indexer reads balances only through [`BalanceSource`]. Failures are opaque
//! to it and are never retried inside a single snapshot; retrying transient
//! transport errors is the source's own concern.
//!
//! - `evm`: JSON-RPC `eth_getBalance` for chains in the `evm` category

use alloy::primitives::U256;
use async_trait::async_trait;

mod error;
mod evm;

pub use error::BalanceSourceError;
pub use evm::EvmBalanceSource;

/// Narrow contract for reading the native balance of an address
#[async_trait]
pub trait BalanceSource: Send + Sync {
	/// Returns the current balance in the chain's smallest unit
	async fn get_balance(&self, address: &str, chain_id: &str) -> Result<U256, BalanceSourceError>;

	/// Whether this source can answer for `chain_id`
	fn supports_chain(&self, chain_id: &str) -> bool;

	/// Returns the symbol of the chain's native token (e.g. "ETH", "DOT")
	async fn get_native_token_symbol(&self, chain_id: &str)
		-> Result<String, BalanceSourceError>;
}
