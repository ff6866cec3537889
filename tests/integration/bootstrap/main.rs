//! Bootstrap from a configuration directory on disk.

use std::{fs, path::Path};

use mockito::Server;
use serde_json::json;
use tempfile::TempDir;
use treasury_indexer::{
	bootstrap::{initialize_services, load_configuration},
	models::{AlertType, Importance},
	services::indexer::IndexerEvent,
};

use crate::integration::mocks::{drain_events, event_names};

fn write_json(path: &Path, value: serde_json::Value) {
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn write_config(dir: &Path, rpc_url: &str) {
	write_json(
		&dir.join("chains").join("ethereum.json"),
		json!({
			"id": "ethereum",
			"name": "Ethereum",
			"rpc_url": rpc_url,
			"explorer_url": "https://etherscan.io",
			"chain_category": "evm",
			"native_token": { "symbol": "ETH", "decimals": 18 }
		}),
	);
	write_json(
		&dir.join("chains").join("polkadot.json"),
		json!({
			"id": "polkadot",
			"name": "Polkadot",
			"rpc_url": "https://rpc.polkadot.io",
			"chain_category": "polkadot-sdk",
			"native_token": { "symbol": "DOT", "decimals": 10 }
		}),
	);
	write_json(
		&dir.join("wallets").join("a_treasury.json"),
		json!({
			"id": "treasury",
			"label": "Main treasury",
			"address": "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
			"chain_id": "ethereum",
			"tags": ["core"],
			"importance": "core-treasury"
		}),
	);
	write_json(
		&dir.join("wallets").join("b_relay.json"),
		json!({
			"id": "relay",
			"label": "Relay account",
			"address": "14ShUZUYUR35RBZW6uVVt1zXDxmSQddkeDdXf1JkMA6P721N",
			"chain_id": "polkadot",
			"importance": "ops"
		}),
	);
	write_json(
		&dir.join("alerts").join("10_large.json"),
		json!([
			{
				"id": "large",
				"wallet_id": "treasury",
				"type": "large-transaction",
				"direction": "above",
				"threshold": 500,
				"window_minutes": 10,
				"channel": "webhook"
			}
		]),
	);
	write_json(
		&dir.join("alerts").join("20_drop.json"),
		json!({
			"id": "drop",
			"account_id": "treasury",
			"type": "balance-drop",
			"direction": "below",
			"threshold": "100",
			"window_minutes": 5,
			"enabled": false,
			"channel": "email"
		}),
	);
	write_json(
		&dir.join("indexer.json"),
		json!({ "sync_interval_ms": 5000, "history_capacity": 10 }),
	);
}

#[tokio::test]
async fn test_configuration_loads_in_file_order() {
	let temp_dir = TempDir::new().unwrap();
	write_config(temp_dir.path(), "https://eth.llamarpc.com");

	let configuration = load_configuration(temp_dir.path()).await.unwrap();

	assert_eq!(configuration.chains.len(), 2);
	let wallet_ids: Vec<&str> = configuration.wallets.iter().map(|w| w.id.as_str()).collect();
	assert_eq!(wallet_ids, vec!["treasury", "relay"]);
	assert_eq!(configuration.wallets[1].importance, Importance::Ops);

	let rule_ids: Vec<&str> = configuration
		.alert_rules
		.iter()
		.map(|r| r.id.as_str())
		.collect();
	assert_eq!(rule_ids, vec!["large", "drop"]);
	assert_eq!(configuration.alert_rules[0].rule_type, AlertType::LargeTransaction);
	assert!(!configuration.alert_rules[1].enabled);

	assert_eq!(configuration.settings.sync_interval_ms, 5000);
	assert_eq!(configuration.settings.history_capacity, 10);
}

#[tokio::test]
async fn test_rule_for_unknown_wallet_is_rejected() {
	let temp_dir = TempDir::new().unwrap();
	write_config(temp_dir.path(), "https://eth.llamarpc.com");
	write_json(
		&temp_dir.path().join("alerts").join("30_orphan.json"),
		json!([{
			"id": "orphan",
			"wallet_id": "ghost",
			"type": "large-tx",
			"direction": "above",
			"threshold": 1,
			"window_minutes": 1,
			"channel": "in-app"
		}]),
	);

	let error = load_configuration(temp_dir.path()).await.unwrap_err();
	assert!(error
		.to_string()
		.contains("Alert rule 'orphan' references non-existent wallet 'ghost'"));
}

#[tokio::test]
async fn test_missing_chains_directory_fails() {
	let temp_dir = TempDir::new().unwrap();
	assert!(load_configuration(temp_dir.path()).await.is_err());
}

#[tokio::test]
async fn test_single_pass_over_configured_wallets() {
	let mut server = Server::new_async().await;
	let _rpc = server
		.mock("POST", "/")
		.with_status(200)
		.with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x64" }).to_string())
		.create_async()
		.await;

	let temp_dir = TempDir::new().unwrap();
	write_config(temp_dir.path(), &server.url());
	let configuration = load_configuration(temp_dir.path()).await.unwrap();

	let (indexer, mut receiver) = initialize_services(&configuration).await.unwrap();
	assert_eq!(
		event_names(&drain_events(&mut receiver)),
		vec!["account:registered", "account:registered"]
	);

	let snapshots = indexer.sync_all().await.unwrap();
	assert_eq!(snapshots.len(), 1);
	assert_eq!(snapshots[0].account_id, "treasury");

	// The Polkadot wallet has no balance source and fails on its own
	let events = drain_events(&mut receiver);
	let failed: Vec<String> = events
		.iter()
		.filter_map(|event| match event {
			IndexerEvent::SnapshotError { account_id, .. } => Some(account_id.clone()),
			_ => None,
		})
		.collect();
	assert_eq!(failed, vec!["relay"]);
}
