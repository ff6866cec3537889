use serde::{Deserialize, Serialize};

/// Connection details and metadata of a supported chain.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChainProfile {
	/// Identifier referenced by watched accounts
	pub id: String,

	/// Human-readable chain name
	pub name: String,

	/// JSON-RPC endpoint used to read balances
	pub rpc_url: String,

	/// Block explorer base URL
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub explorer_url: Option<String>,

	/// Chain family, which decides the balance source able to serve it
	pub chain_category: ChainCategory,

	/// Native token of the chain
	pub native_token: NativeToken,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ChainCategory {
	PolkadotSdk,
	Evm,
	Other,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NativeToken {
	pub symbol: String,
	pub decimals: u8,
}
