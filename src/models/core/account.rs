use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An address on a chain registered for periodic balance observation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WatchedAccount {
	/// Unique key of the account across the store
	pub id: String,

	/// Human-readable label shown to operators
	pub label: String,

	/// On-chain address, in the chain's native format
	pub address: String,

	/// Identifier of the chain profile the address lives on
	pub chain_id: String,

	/// Free-form ordered tags
	#[serde(default)]
	pub tags: Vec<String>,

	/// How closely movements on this account should be watched
	pub importance: Importance,

	/// Arbitrary extra attributes carried alongside the account
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Importance classification of a watched account
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
	/// Primary treasury holdings
	CoreTreasury,
	/// Operational hot wallets
	Ops,
	/// Third-party addresses kept under observation
	Watchlist,
}

impl WatchedAccount {
	/// Appends `tag` unless it is already present.
	pub fn add_tag(&mut self, tag: impl Into<String>) {
		let tag = tag.into();
		if !self.tags.contains(&tag) {
			self.tags.push(tag);
		}
	}

	/// Removes every occurrence of `tag`, returning whether anything was removed.
	pub fn remove_tag(&mut self, tag: &str) -> bool {
		let before = self.tags.len();
		self.tags.retain(|t| t != tag);
		before != self.tags.len()
	}
}
