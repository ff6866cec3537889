//! EVM balance source.
//!
//! Queries `eth_getBalance(address, "latest")` on the chain profile's RPC URL
//! through a retryable HTTP client.

use std::{collections::HashMap, str::FromStr};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{json, Value};

use crate::{
	models::{ChainCategory, ChainProfile},
	services::balance::{BalanceSource, BalanceSourceError},
	utils::http::{
		create_base_http_client, create_retryable_http_client, RetryConfig,
		TransientErrorRetryStrategy,
	},
};

/// Balance source for chains in the `evm` category
#[derive(Clone, Debug)]
pub struct EvmBalanceSource {
	client: ClientWithMiddleware,
	chains: HashMap<String, ChainProfile>,
}

fn chain_metadata(chain_id: &str) -> Option<HashMap<String, String>> {
	Some(HashMap::from([("chain_id".to_string(), chain_id.to_string())]))
}

impl EvmBalanceSource {
	/// Creates a source for `chains` with the default retry policy
	pub fn new(chains: HashMap<String, ChainProfile>) -> Result<Self, BalanceSourceError> {
		Self::with_retry_config(chains, &RetryConfig::default())
	}

	pub fn with_retry_config(
		chains: HashMap<String, ChainProfile>,
		retry_config: &RetryConfig,
	) -> Result<Self, BalanceSourceError> {
		let base_client = create_base_http_client().map_err(|e| {
			BalanceSourceError::request_error(
				"Failed to create base HTTP client",
				Some(Box::new(e)),
				None,
			)
		})?;
		let client = create_retryable_http_client(
			retry_config,
			base_client,
			Some(TransientErrorRetryStrategy),
		);
		Ok(Self::with_client(chains, client))
	}

	pub fn with_client(chains: HashMap<String, ChainProfile>, client: ClientWithMiddleware) -> Self {
		let evm_chains = chains.values().filter(|c| c.chain_category == ChainCategory::Evm).count();
		tracing::debug!(
			"EVM balance source ready for {} of {} chains",
			evm_chains,
			chains.len()
		);
		Self { client, chains }
	}

	fn evm_profile(&self, chain_id: &str) -> Result<&ChainProfile, BalanceSourceError> {
		let profile = self.chains.get(chain_id).ok_or_else(|| {
			BalanceSourceError::unsupported_chain(
				format!("chain '{}' is not configured", chain_id),
				None,
				chain_metadata(chain_id),
			)
		})?;

		if profile.chain_category != ChainCategory::Evm {
			return Err(BalanceSourceError::unsupported_chain(
				format!("chain '{}' is not an EVM chain", chain_id),
				None,
				chain_metadata(chain_id),
			));
		}

		Ok(profile)
	}

	async fn send_rpc(
		&self,
		profile: &ChainProfile,
		method: &str,
		params: Value,
	) -> Result<Value, BalanceSourceError> {
		let request_body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params
		});

		let response = self
			.client
			.post(&profile.rpc_url)
			.header("Content-Type", "application/json")
			.json(&request_body)
			.send()
			.await
			.map_err(|e| {
				BalanceSourceError::request_error(
					format!("{} request to chain '{}' failed", method, profile.id),
					Some(Box::new(e)),
					chain_metadata(&profile.id),
				)
			})?;

		let status = response.status();
		if !status.is_success() {
			let error_body = response.text().await.unwrap_or_default();
			return Err(BalanceSourceError::request_error(
				format!("HTTP error {}: {}", status, error_body),
				None,
				chain_metadata(&profile.id),
			));
		}

		let body: Value = response.json().await.map_err(|e| {
			BalanceSourceError::invalid_response(
				format!("{} response from chain '{}' is not JSON", method, profile.id),
				Some(Box::new(e)),
				chain_metadata(&profile.id),
			)
		})?;

		if let Some(error) = body.get("error") {
			let message = error
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or("unknown error");
			return Err(BalanceSourceError::request_error(
				format!("RPC error from chain '{}': {}", profile.id, message),
				None,
				chain_metadata(&profile.id),
			));
		}

		body.get("result").cloned().ok_or_else(|| {
			BalanceSourceError::invalid_response(
				format!("{} response from chain '{}' has no result", method, profile.id),
				None,
				chain_metadata(&profile.id),
			)
		})
	}
}

/// Parses a `0x`-prefixed hex quantity.
fn parse_hex_quantity(value: &str) -> Option<U256> {
	let digits = value.strip_prefix("0x")?;
	if digits.is_empty() {
		return None;
	}
	U256::from_str_radix(digits, 16).ok()
}

#[async_trait]
impl BalanceSource for EvmBalanceSource {
	async fn get_balance(&self, address: &str, chain_id: &str) -> Result<U256, BalanceSourceError> {
		let profile = self.evm_profile(chain_id)?;

		Address::from_str(address).map_err(|e| {
			BalanceSourceError::invalid_address(
				format!("invalid EVM address: {}", address),
				Some(Box::new(e)),
				chain_metadata(chain_id),
			)
		})?;

		let result = self
			.send_rpc(profile, "eth_getBalance", json!([address, "latest"]))
			.await?;

		result
			.as_str()
			.and_then(parse_hex_quantity)
			.ok_or_else(|| {
				BalanceSourceError::invalid_response(
					format!("malformed balance from chain '{}': {}", chain_id, result),
					None,
					chain_metadata(chain_id),
				)
			})
	}

	fn supports_chain(&self, chain_id: &str) -> bool {
		self.chains
			.get(chain_id)
			.is_some_and(|profile| profile.chain_category == ChainCategory::Evm)
	}

	async fn get_native_token_symbol(
		&self,
		chain_id: &str,
	) -> Result<String, BalanceSourceError> {
		self.chains
			.get(chain_id)
			.map(|profile| profile.native_token.symbol.clone())
			.ok_or_else(|| {
				BalanceSourceError::unsupported_chain(
					format!("chain '{}' is not configured", chain_id),
					None,
					chain_metadata(chain_id),
				)
			})
	}
}
