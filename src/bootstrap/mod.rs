//! Bootstrap module for initializing services and wiring the event subscriber.
//!
//! This module reads the configuration directory, builds the indexer with its
//! default collaborators and registers the configured wallets. It also provides
//! the event subscriber that logs every indexer event and feeds the metrics.
//!
//! # Services
//! - `ChainService`: Read-only chain profiles
//! - `EvmBalanceSource`: Default balance source for EVM chains
//! - `InMemoryAccountRepository`: Snapshot store
//! - `WalletIndexerService`: The indexing orchestrator

use std::{collections::HashMap, error::Error, path::Path, sync::Arc};

use tokio::{
	sync::broadcast::{self, error::RecvError},
	task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
	models::{AlertRule, ChainProfile, IndexerConfig, WatchedAccount},
	repositories::{
		AlertRuleRepository, ChainRepository, ChainService, InMemoryAccountRepository,
		WalletConfigRepository,
	},
	services::{
		balance::{BalanceSource, EvmBalanceSource},
		indexer::{AlertRules, IndexerEvent, WalletIndexerService},
	},
	utils::metrics,
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Indexer with the default store and balance source
pub type DefaultIndexer = WalletIndexerService<InMemoryAccountRepository, EvmBalanceSource>;

/// Everything read from the configuration directory
#[derive(Debug, Clone)]
pub struct IndexerConfiguration {
	pub chains: HashMap<String, ChainProfile>,
	pub wallets: Vec<WatchedAccount>,
	pub alert_rules: Vec<AlertRule>,
	pub settings: IndexerConfig,
}

/// Loads and cross-validates the configuration under `config_dir`.
///
/// Chains are loaded first, wallets are checked against them and alert rules
/// against the wallets. The `alerts` directory and `indexer.json` are optional.
pub async fn load_configuration(config_dir: &Path) -> Result<IndexerConfiguration> {
	let chain_service =
		ChainService::<ChainRepository>::new_with_path(Some(&config_dir.join("chains"))).await?;
	let wallet_repository =
		WalletConfigRepository::new(Some(&config_dir.join("wallets")), &chain_service).await?;
	let alerts_dir = config_dir.join("alerts");
	let alert_rules = if alerts_dir.exists() {
		AlertRuleRepository::new(Some(&alerts_dir), &wallet_repository.wallets)
			.await?
			.get_all()
	} else {
		debug!("No alerts directory in {}, starting without rules", config_dir.display());
		Vec::new()
	};
	let settings = IndexerConfig::load(config_dir)?;

	Ok(IndexerConfiguration {
		chains: chain_service.get_all(),
		wallets: wallet_repository.get_all(),
		alert_rules,
		settings,
	})
}

/// Builds the indexer from a loaded configuration and registers its wallets.
///
/// The returned receiver is subscribed before any wallet is registered, so it
/// observes every event the indexer publishes.
pub async fn initialize_services(
	configuration: &IndexerConfiguration,
) -> Result<(Arc<DefaultIndexer>, broadcast::Receiver<IndexerEvent>)> {
	configuration.settings.validate()?;

	let balance_source = Arc::new(EvmBalanceSource::new(configuration.chains.clone())?);
	let repository = Arc::new(InMemoryAccountRepository::with_history_capacity(
		configuration.settings.history_capacity,
	));
	let alert_rules = AlertRules::new(configuration.alert_rules.clone());

	let indexer = WalletIndexerService::new(
		repository,
		Some(balance_source.clone()),
		&configuration.settings,
	)
	.with_alert_rules(alert_rules);
	let receiver = indexer.events().subscribe();

	warn_unsupported_wallets(&configuration.wallets, balance_source.as_ref());
	for wallet in &configuration.wallets {
		indexer.register_account(wallet.clone()).await?;
	}

	info!(
		"Indexer initialized with {} wallet(s), {} chain(s) and {} alert rule(s)",
		configuration.wallets.len(),
		configuration.chains.len(),
		configuration.alert_rules.len()
	);

	Ok((Arc::new(indexer), receiver))
}

/// Wallets on chains that `source` cannot read.
///
/// They load and register normally, but every snapshot of them fails.
pub fn unsupported_wallets<'a, B: BalanceSource>(
	wallets: &'a [WatchedAccount],
	source: &B,
) -> Vec<&'a WatchedAccount> {
	wallets
		.iter()
		.filter(|wallet| !source.supports_chain(&wallet.chain_id))
		.collect()
}

/// Warns once per wallet that `source` cannot read; returns how many there are.
pub fn warn_unsupported_wallets<B: BalanceSource>(wallets: &[WatchedAccount], source: &B) -> usize {
	let unsupported = unsupported_wallets(wallets, source);
	for wallet in &unsupported {
		warn!(
			"Wallet '{}' is on chain '{}', which has no balance source; its snapshots will fail",
			wallet.id, wallet.chain_id
		);
	}
	unsupported.len()
}

/// Logs one event at the level matching its kind.
pub fn log_event(event: &IndexerEvent) {
	match event {
		IndexerEvent::AccountRegistered { account_id, account } => info!(
			event = event.name(),
			account_id = %account_id,
			chain_id = %account.chain_id,
			"Account registered"
		),
		IndexerEvent::AccountUnregistered { account_id } => {
			info!(event = event.name(), account_id = %account_id, "Account unregistered")
		}
		IndexerEvent::SyncStarted { interval_ms } => {
			info!(event = event.name(), interval_ms, "Periodic sync started")
		}
		IndexerEvent::SyncStopped => info!(event = event.name(), "Periodic sync stopped"),
		IndexerEvent::SyncStart { account_count } => {
			info!(event = event.name(), account_count, "Sync pass started")
		}
		IndexerEvent::SyncComplete { snapshot_count } => {
			info!(event = event.name(), snapshot_count, "Sync pass complete")
		}
		IndexerEvent::SyncError { error, trace_id } => error!(
			event = event.name(),
			trace_id = %trace_id,
			"Sync pass failed: {}",
			error
		),
		IndexerEvent::SnapshotCreated {
			account_id,
			snapshot,
		} => debug!(
			event = event.name(),
			account_id = %account_id,
			balance = %snapshot.balance,
			"Snapshot created"
		),
		IndexerEvent::SnapshotError {
			account_id,
			error,
			trace_id,
		} => error!(
			event = event.name(),
			account_id = %account_id,
			trace_id = %trace_id,
			"Snapshot failed: {}",
			error
		),
		IndexerEvent::SignificantMovement {
			account_id,
			delta,
			matched_rule,
		} => warn!(
			event = event.name(),
			account_id = %account_id,
			delta = %delta.delta,
			percentage_change = %delta.percentage_change,
			matched_rule = matched_rule.as_ref().map(|rule| rule.id.as_str()),
			"Significant balance movement"
		),
		IndexerEvent::AlertTriggered {
			account_id,
			rule,
			delta,
		} => warn!(
			event = event.name(),
			account_id = %account_id,
			rule_id = %rule.id,
			channel = rule.channel.as_str(),
			delta = %delta.delta,
			"Alert triggered"
		),
	}
}

/// Spawns the subscriber that logs events and updates metrics.
///
/// The task ends once every publisher is gone and the backlog is drained.
pub fn spawn_event_logger(mut receiver: broadcast::Receiver<IndexerEvent>) -> JoinHandle<()> {
	tokio::spawn(async move {
		loop {
			match receiver.recv().await {
				Ok(event) => {
					log_event(&event);
					metrics::record_event(&event);
				}
				Err(RecvError::Lagged(skipped)) => {
					warn!("Event subscriber lagged, {} event(s) dropped", skipped);
				}
				Err(RecvError::Closed) => {
					debug!("Event bus closed, subscriber exiting");
					break;
				}
			}
		}
	})
}
