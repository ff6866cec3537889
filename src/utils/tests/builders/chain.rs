//! Test helper utilities for chain profiles
//!
//! - `ChainProfileBuilder`: Builder for creating test ChainProfile instances

use crate::models::{ChainCategory, ChainProfile, NativeToken};

/// Builder for creating test ChainProfile instances
pub struct ChainProfileBuilder {
	id: String,
	name: String,
	rpc_url: String,
	explorer_url: Option<String>,
	chain_category: ChainCategory,
	symbol: String,
	decimals: u8,
	notes: Option<String>,
}

impl Default for ChainProfileBuilder {
	fn default() -> Self {
		Self {
			id: "ethereum".to_string(),
			name: "Ethereum".to_string(),
			rpc_url: "https://eth.llamarpc.com".to_string(),
			explorer_url: None,
			chain_category: ChainCategory::Evm,
			symbol: "ETH".to_string(),
			decimals: 18,
			notes: None,
		}
	}
}

impl ChainProfileBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn id(mut self, id: &str) -> Self {
		self.id = id.to_string();
		self
	}

	pub fn name(mut self, name: &str) -> Self {
		self.name = name.to_string();
		self
	}

	pub fn rpc_url(mut self, rpc_url: &str) -> Self {
		self.rpc_url = rpc_url.to_string();
		self
	}

	pub fn explorer_url(mut self, explorer_url: &str) -> Self {
		self.explorer_url = Some(explorer_url.to_string());
		self
	}

	pub fn category(mut self, category: ChainCategory) -> Self {
		self.chain_category = category;
		self
	}

	pub fn symbol(mut self, symbol: &str) -> Self {
		self.symbol = symbol.to_string();
		self
	}

	pub fn decimals(mut self, decimals: u8) -> Self {
		self.decimals = decimals;
		self
	}

	pub fn notes(mut self, notes: &str) -> Self {
		self.notes = Some(notes.to_string());
		self
	}

	pub fn build(self) -> ChainProfile {
		ChainProfile {
			id: self.id,
			name: self.name,
			rpc_url: self.rpc_url,
			explorer_url: self.explorer_url,
			chain_category: self.chain_category,
			native_token: NativeToken {
				symbol: self.symbol,
				decimals: self.decimals,
			},
			notes: self.notes,
		}
	}
}
