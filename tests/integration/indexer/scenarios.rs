//! End-to-end movement detection through the indexer with an in-memory store.

use std::sync::Arc;

use alloy::primitives::U256;
use treasury_indexer::{
	models::{AlertDirection, AlertType, IndexerConfig},
	repositories::InMemoryAccountRepository,
	services::indexer::{AlertRules, IndexerEvent, WalletIndexerService},
	utils::tests::builders::{account::AccountBuilder, alert_rule::AlertRuleBuilder},
};

use crate::integration::mocks::{
	drain_events, event_names, scripted_source, MockBalanceSource, Reply, YieldingRepository,
};

type TestIndexer = WalletIndexerService<InMemoryAccountRepository, MockBalanceSource>;

fn config(threshold_percent: f64, min_absolute_change: u64) -> IndexerConfig {
	IndexerConfig {
		default_threshold_percent: threshold_percent,
		min_absolute_change: U256::from(min_absolute_change),
		..IndexerConfig::default()
	}
}

async fn indexer_with(
	source: MockBalanceSource,
	config: &IndexerConfig,
	accounts: &[(&str, &str)],
) -> TestIndexer {
	let indexer = WalletIndexerService::new(
		Arc::new(InMemoryAccountRepository::with_history_capacity(
			config.history_capacity,
		)),
		Some(Arc::new(source)),
		config,
	);
	for (id, address) in accounts {
		indexer
			.register_account(AccountBuilder::new().id(id).address(address).build())
			.await
			.unwrap();
	}
	indexer
}

#[tokio::test]
async fn test_ten_percent_increase_triggers_matching_alert() {
	let source = scripted_source(vec![(
		"0xa",
		vec![Reply::Balance(1000), Reply::Balance(1100)],
	)]);
	let indexer = indexer_with(source, &config(5.0, 1_000_000), &[("a", "0xa")]).await;
	indexer
		.alert_rules()
		.push(
			AlertRuleBuilder::new()
				.id("inflow")
				.account_id("a")
				.rule_type(AlertType::BalanceIncrease)
				.direction(AlertDirection::Above)
				.threshold(50)
				.build(),
		)
		.await;
	let mut receiver = indexer.events().subscribe();

	assert_eq!(indexer.sync_all().await.unwrap().len(), 1);
	assert_eq!(indexer.sync_all().await.unwrap().len(), 1);

	let events = drain_events(&mut receiver);
	assert_eq!(
		event_names(&events),
		vec![
			"sync:start",
			"snapshot:created",
			"sync:complete",
			"sync:start",
			"snapshot:created",
			"movement:significant",
			"alert:triggered",
			"sync:complete",
		]
	);

	match &events[5] {
		IndexerEvent::SignificantMovement {
			delta,
			matched_rule,
			..
		} => {
			assert_eq!(delta.previous_balance, U256::from(1000u64));
			assert_eq!(delta.current_balance, U256::from(1100u64));
			assert_eq!(delta.delta.to_string(), "100");
			assert_eq!(delta.percentage_change.to_string(), "10.00");
			assert_eq!(matched_rule.as_ref().unwrap().id, "inflow");
		}
		other => panic!("unexpected event {:?}", other),
	}
	match &events[6] {
		IndexerEvent::AlertTriggered { rule, delta, .. } => {
			assert_eq!(rule.id, "inflow");
			assert!(delta.delta.is_positive());
		}
		other => panic!("unexpected event {:?}", other),
	}
}

#[tokio::test]
async fn test_small_drop_is_recorded_without_movement() {
	let source = scripted_source(vec![(
		"0xb",
		vec![Reply::Balance(500), Reply::Balance(495)],
	)]);
	let indexer = indexer_with(source, &config(5.0, 10), &[("b", "0xb")]).await;
	let mut receiver = indexer.events().subscribe();

	indexer.create_snapshot("b").await.unwrap();
	indexer.create_snapshot("b").await.unwrap();

	assert_eq!(
		event_names(&drain_events(&mut receiver)),
		vec!["snapshot:created", "snapshot:created"]
	);

	let history = indexer.get_account_history("b", None).await.unwrap();
	let balances: Vec<U256> = history.iter().map(|s| s.balance).collect();
	assert_eq!(balances, vec![U256::from(500u64), U256::from(495u64)]);
}

#[tokio::test]
async fn test_unchanged_balance_produces_no_movement() {
	let source = scripted_source(vec![("0xa", vec![Reply::Balance(42)])]);
	let indexer = indexer_with(source, &config(0.0, 0), &[("a", "0xa")]).await;
	let mut receiver = indexer.events().subscribe();

	indexer.create_snapshot("a").await.unwrap();
	indexer.create_snapshot("a").await.unwrap();

	let names = event_names(&drain_events(&mut receiver));
	assert!(!names.contains(&"movement:significant"));
	assert_eq!(names.len(), 2);
}

#[tokio::test]
async fn test_significant_movement_without_matching_rule() {
	let source = scripted_source(vec![(
		"0xa",
		vec![Reply::Balance(1_000), Reply::Balance(100)],
	)]);
	let indexer = indexer_with(source, &config(5.0, 0), &[("a", "0xa")]).await;
	indexer
		.alert_rules()
		.push(
			AlertRuleBuilder::new()
				.account_id("a")
				.rule_type(AlertType::BalanceIncrease)
				.direction(AlertDirection::Above)
				.threshold(1)
				.build(),
		)
		.await;
	let mut receiver = indexer.events().subscribe();

	indexer.create_snapshot("a").await.unwrap();
	indexer.create_snapshot("a").await.unwrap();

	let events = drain_events(&mut receiver);
	assert_eq!(
		event_names(&events),
		vec!["snapshot:created", "snapshot:created", "movement:significant"]
	);
	match &events[2] {
		IndexerEvent::SignificantMovement {
			delta,
			matched_rule,
			..
		} => {
			assert_eq!(delta.delta.to_string(), "-900");
			assert_eq!(delta.percentage_change.to_string(), "-90.00");
			assert!(matched_rule.is_none());
		}
		other => panic!("unexpected event {:?}", other),
	}
}

#[tokio::test]
async fn test_first_matching_rule_wins_and_edits_apply_to_next_movement() {
	let source = scripted_source(vec![(
		"0xa",
		vec![
			Reply::Balance(1_000),
			Reply::Balance(2_000),
			Reply::Balance(3_000),
		],
	)]);
	let rules = AlertRules::new(vec![
		AlertRuleBuilder::new()
			.id("first")
			.account_id("a")
			.rule_type(AlertType::LargeTransaction)
			.threshold(500)
			.build(),
		AlertRuleBuilder::new()
			.id("second")
			.account_id("a")
			.rule_type(AlertType::LargeTransaction)
			.threshold(100)
			.build(),
	]);
	let indexer = indexer_with(source, &config(5.0, 0), &[("a", "0xa")])
		.await
		.with_alert_rules(rules.clone());
	let mut receiver = indexer.events().subscribe();

	indexer.create_snapshot("a").await.unwrap();
	indexer.create_snapshot("a").await.unwrap();

	let triggered: Vec<String> = drain_events(&mut receiver)
		.into_iter()
		.filter_map(|event| match event {
			IndexerEvent::AlertTriggered { rule, .. } => Some(rule.id),
			_ => None,
		})
		.collect();
	assert_eq!(triggered, vec!["first"]);

	// Disabling through a clone of the list takes effect immediately
	assert!(rules.set_enabled("first", false).await);
	indexer.create_snapshot("a").await.unwrap();

	let triggered: Vec<String> = drain_events(&mut receiver)
		.into_iter()
		.filter_map(|event| match event {
			IndexerEvent::AlertTriggered { rule, .. } => Some(rule.id),
			_ => None,
		})
		.collect();
	assert_eq!(triggered, vec!["second"]);
}

#[tokio::test]
async fn test_history_is_capped_and_readable_through_the_indexer() {
	let replies = (1..=6).map(Reply::Balance).collect();
	let source = scripted_source(vec![("0xa", replies)]);
	let settings = IndexerConfig {
		history_capacity: 3,
		..config(5.0, 0)
	};
	let indexer = indexer_with(source, &settings, &[("a", "0xa")]).await;

	for _ in 0..6 {
		indexer.create_snapshot("a").await.unwrap();
	}

	let history = indexer.get_account_history("a", None).await.unwrap();
	let balances: Vec<U256> = history.iter().map(|s| s.balance).collect();
	assert_eq!(
		balances,
		vec![U256::from(4u64), U256::from(5u64), U256::from(6u64)]
	);

	let latest = indexer.get_latest_snapshot("a").await.unwrap().unwrap();
	assert_eq!(latest.balance, U256::from(6u64));

	let limited = indexer.get_account_history("a", Some(2)).await.unwrap();
	assert_eq!(limited.len(), 2);
	assert_eq!(limited[1].balance, U256::from(6u64));
}

#[tokio::test]
async fn test_unregister_removes_history_and_publishes() {
	let source = scripted_source(vec![("0xa", vec![Reply::Balance(1)])]);
	let indexer = indexer_with(source, &config(5.0, 0), &[("a", "0xa")]).await;
	indexer.create_snapshot("a").await.unwrap();
	let mut receiver = indexer.events().subscribe();

	indexer.unregister_account("a").await.unwrap();

	assert!(indexer.get_all_accounts().await.unwrap().is_empty());
	assert!(indexer.get_account_history("a", None).await.unwrap().is_empty());
	assert_eq!(
		event_names(&drain_events(&mut receiver)),
		vec!["account:unregistered"]
	);

	// Re-registering starts from an empty history
	indexer
		.register_account(AccountBuilder::new().id("a").address("0xa").build())
		.await
		.unwrap();
	assert!(indexer.get_latest_snapshot("a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_snapshots_of_one_account_chain_their_deltas() {
	let source = scripted_source(vec![(
		"0xa",
		vec![Reply::Balance(100), Reply::Balance(200)],
	)]);
	let indexer = WalletIndexerService::new(
		Arc::new(YieldingRepository::default()),
		Some(Arc::new(source)),
		&config(5.0, 1_000_000),
	);
	indexer
		.register_account(AccountBuilder::new().id("a").address("0xa").build())
		.await
		.unwrap();
	indexer.create_snapshot("a").await.unwrap();
	let mut receiver = indexer.events().subscribe();

	// Both calls read 200; only the first of them moves the balance
	let (first, second) = tokio::join!(indexer.create_snapshot("a"), indexer.create_snapshot("a"));
	first.unwrap();
	second.unwrap();

	let events = drain_events(&mut receiver);
	let movements: Vec<&IndexerEvent> = events
		.iter()
		.filter(|event| matches!(event, IndexerEvent::SignificantMovement { .. }))
		.collect();
	assert_eq!(movements.len(), 1);
	match movements[0] {
		IndexerEvent::SignificantMovement { delta, .. } => {
			assert_eq!(delta.previous_balance, U256::from(100u64));
			assert_eq!(delta.current_balance, U256::from(200u64));
		}
		other => panic!("unexpected event {:?}", other),
	}

	let balances: Vec<U256> = indexer
		.get_account_history("a", None)
		.await
		.unwrap()
		.iter()
		.map(|snapshot| snapshot.balance)
		.collect();
	assert_eq!(
		balances,
		vec![U256::from(100u64), U256::from(200u64), U256::from(200u64)]
	);
}
