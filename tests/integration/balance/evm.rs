//! EVM balance source against a mock JSON-RPC endpoint.

use std::{collections::HashMap, sync::Arc};

use alloy::primitives::U256;
use mockito::{Matcher, Server};
use serde_json::json;
use treasury_indexer::{
	models::{ChainProfile, IndexerConfig},
	repositories::InMemoryAccountRepository,
	services::{
		balance::{BalanceSource, BalanceSourceError, EvmBalanceSource},
		indexer::{IndexerEvent, WalletIndexerService},
	},
	utils::tests::{
		builders::{account::AccountBuilder, chain::ChainProfileBuilder},
		create_test_http_client,
	},
};

use crate::integration::mocks::drain_events;

const ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

fn chains(rpc_url: &str) -> HashMap<String, ChainProfile> {
	HashMap::from([(
		"ethereum".to_string(),
		ChainProfileBuilder::new()
			.id("ethereum")
			.rpc_url(rpc_url)
			.build(),
	)])
}

fn source(rpc_url: &str, max_retries: u32) -> EvmBalanceSource {
	EvmBalanceSource::with_client(chains(rpc_url), create_test_http_client(max_retries))
}

fn rpc_result(result: &str) -> String {
	json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

#[tokio::test]
async fn test_get_balance_sends_eth_get_balance() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(Matcher::PartialJson(json!({
			"method": "eth_getBalance",
			"params": [ADDRESS, "latest"]
		})))
		.with_status(200)
		.with_header("content-type", "application/json")
		.with_body(rpc_result("0xde0b6b3a7640000"))
		.expect(1)
		.create_async()
		.await;

	let balance = source(&server.url(), 0)
		.get_balance(ADDRESS, "ethereum")
		.await
		.unwrap();

	assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_rpc_error_object_is_a_request_error() {
	let mut server = Server::new_async().await;
	let _mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(
			json!({
				"jsonrpc": "2.0",
				"id": 1,
				"error": { "code": -32000, "message": "header not found" }
			})
			.to_string(),
		)
		.create_async()
		.await;

	let error = source(&server.url(), 0)
		.get_balance(ADDRESS, "ethereum")
		.await
		.unwrap_err();

	assert!(matches!(error, BalanceSourceError::RequestError(_)));
	assert!(error.to_string().contains("header not found"));
}

#[tokio::test]
async fn test_malformed_quantity_is_an_invalid_response() {
	let mut server = Server::new_async().await;
	let _mock = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(rpc_result("0xnothex"))
		.create_async()
		.await;

	let error = source(&server.url(), 0)
		.get_balance(ADDRESS, "ethereum")
		.await
		.unwrap_err();

	assert!(matches!(error, BalanceSourceError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_server_errors_are_retried_then_reported() {
	let mut server = Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.with_status(503)
		.with_body("unavailable")
		.expect(3)
		.create_async()
		.await;

	let error = source(&server.url(), 2)
		.get_balance(ADDRESS, "ethereum")
		.await
		.unwrap_err();

	assert!(matches!(error, BalanceSourceError::RequestError(_)));
	assert!(error.to_string().contains("503"));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_indexer_detects_movement_from_rpc_balances() {
	let mut server = Server::new_async().await;
	let first = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(rpc_result("0x3e8"))
		.expect(1)
		.create_async()
		.await;

	let indexer = WalletIndexerService::new(
		Arc::new(InMemoryAccountRepository::new()),
		Some(Arc::new(source(&server.url(), 0))),
		&IndexerConfig::default(),
	);
	indexer
		.register_account(AccountBuilder::new().id("treasury").address(ADDRESS).build())
		.await
		.unwrap();
	let mut receiver = indexer.events().subscribe();

	indexer.sync_all().await.unwrap();
	first.assert_async().await;
	first.remove_async().await;

	let _second = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(rpc_result("0x44c"))
		.create_async()
		.await;
	indexer.sync_all().await.unwrap();

	let movement = drain_events(&mut receiver)
		.into_iter()
		.find_map(|event| match event {
			IndexerEvent::SignificantMovement { delta, .. } => Some(delta),
			_ => None,
		})
		.expect("movement should be detected");
	assert_eq!(movement.previous_balance, U256::from(1000u64));
	assert_eq!(movement.current_balance, U256::from(1100u64));
	assert_eq!(movement.percentage_change.to_string(), "10.00");
}
