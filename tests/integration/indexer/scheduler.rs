//! Periodic sync loop behavior on paused tokio time.

use std::{sync::Arc, time::Duration};

use treasury_indexer::{
	models::IndexerConfig,
	repositories::InMemoryAccountRepository,
	services::indexer::{IndexerEvent, WalletIndexerService},
	utils::tests::builders::account::AccountBuilder,
};

use crate::integration::mocks::{drain_events, scripted_source, MockBalanceSource, Reply};

async fn scheduled_indexer(
	interval_ms: u64,
) -> Arc<WalletIndexerService<InMemoryAccountRepository, MockBalanceSource>> {
	let source = scripted_source(vec![("0xa", vec![Reply::Balance(7)])]);
	let indexer = WalletIndexerService::new(
		Arc::new(InMemoryAccountRepository::new()),
		Some(Arc::new(source)),
		&IndexerConfig {
			sync_interval_ms: interval_ms,
			..IndexerConfig::default()
		},
	);
	indexer
		.register_account(AccountBuilder::new().id("a").address("0xa").build())
		.await
		.unwrap();
	Arc::new(indexer)
}

fn count(events: &[IndexerEvent], name: &str) -> usize {
	events.iter().filter(|event| event.name() == name).count()
}

#[tokio::test(start_paused = true)]
async fn test_loop_runs_immediately_then_on_interval() {
	let indexer = scheduled_indexer(1000).await;
	let mut receiver = indexer.events().subscribe();

	assert!(indexer.start(None));
	assert!(indexer.is_running());

	// A second start changes nothing
	assert!(!indexer.start(Some(Duration::from_millis(10))));

	tokio::time::sleep(Duration::from_millis(2500)).await;
	assert!(indexer.stop());
	assert!(!indexer.is_running());
	assert!(!indexer.stop());

	tokio::time::sleep(Duration::from_millis(5000)).await;

	let events = drain_events(&mut receiver);
	assert_eq!(count(&events, "sync:started"), 1);
	assert_eq!(count(&events, "sync:start"), 3);
	assert_eq!(count(&events, "sync:complete"), 3);
	assert_eq!(count(&events, "sync:stopped"), 1);
	assert!(matches!(
		events.first(),
		Some(IndexerEvent::SyncStarted { interval_ms: 1000 })
	));

	let history = indexer.get_account_history("a", None).await.unwrap();
	assert_eq!(history.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_interval_overrides_configuration() {
	let indexer = scheduled_indexer(60_000).await;
	let mut receiver = indexer.events().subscribe();

	assert!(indexer.start(Some(Duration::from_millis(100))));
	tokio::time::sleep(Duration::from_millis(450)).await;
	indexer.stop();

	let events = drain_events(&mut receiver);
	assert!(matches!(
		events.first(),
		Some(IndexerEvent::SyncStarted { interval_ms: 100 })
	));
	assert_eq!(count(&events, "sync:start"), 5);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_falls_back_to_configuration() {
	let indexer = scheduled_indexer(2000).await;
	let mut receiver = indexer.events().subscribe();

	assert!(indexer.start(Some(Duration::ZERO)));
	tokio::time::sleep(Duration::from_millis(10)).await;
	indexer.stop();

	let events = drain_events(&mut receiver);
	assert!(matches!(
		events.first(),
		Some(IndexerEvent::SyncStarted { interval_ms: 2000 })
	));
	assert_eq!(count(&events, "sync:start"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop() {
	let indexer = scheduled_indexer(1000).await;
	let mut receiver = indexer.events().subscribe();

	assert!(indexer.start(None));
	tokio::time::sleep(Duration::from_millis(10)).await;
	assert!(indexer.stop());
	assert!(indexer.start(None));
	tokio::time::sleep(Duration::from_millis(10)).await;
	assert!(indexer.stop());

	let events = drain_events(&mut receiver);
	assert_eq!(count(&events, "sync:started"), 2);
	assert_eq!(count(&events, "sync:stopped"), 2);
	assert_eq!(count(&events, "sync:start"), 2);
}
