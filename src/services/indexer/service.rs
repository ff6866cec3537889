//! Wallet indexer service.
//!
//! Owns the watch list lifecycle, takes balance snapshots through a
//! [`BalanceSource`], evaluates movements between consecutive snapshots and runs
//! the periodic sync loop. Every state transition is published on the
//! service's [`EventBus`].

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use chrono::Utc;
use futures::{stream, StreamExt};
use tokio::{
	sync::{watch, Mutex as AsyncMutex},
	task::JoinHandle,
	time::MissedTickBehavior,
};

use crate::{
	models::{BalanceSnapshot, IndexerConfig, WatchedAccount},
	repositories::{AccountRepositoryTrait, DEFAULT_HISTORY_LIMIT},
	services::{
		balance::BalanceSource,
		indexer::{
			compute_delta, is_significant, AlertRules, EventBus, IndexerError, IndexerEvent,
			MovementThresholds,
		},
	},
	utils::logging::error::TraceableError,
};

/// Handle of a running sync loop
struct SyncLoop {
	shutdown_tx: watch::Sender<bool>,
	_handle: JoinHandle<()>,
}

/// Orchestrates snapshots, movement detection and the sync schedule
pub struct WalletIndexerService<R, B> {
	repository: Arc<R>,
	balance_source: Option<Arc<B>>,
	alert_rules: AlertRules,
	events: EventBus,
	thresholds: MovementThresholds,
	sync_interval: Duration,
	max_concurrent_snapshots: usize,
	/// Serializes sync passes
	pass_lock: AsyncMutex<()>,
	sync_loop: Mutex<Option<SyncLoop>>,
}

impl<R, B> WalletIndexerService<R, B>
where
	R: AccountRepositoryTrait + 'static,
	B: BalanceSource + 'static,
{
	/// Creates a stopped service with an empty rule list and its own event bus
	pub fn new(repository: Arc<R>, balance_source: Option<Arc<B>>, config: &IndexerConfig) -> Self {
		Self {
			repository,
			balance_source,
			alert_rules: AlertRules::default(),
			events: EventBus::default(),
			thresholds: MovementThresholds::from(config),
			sync_interval: Duration::from_millis(config.sync_interval_ms.max(1)),
			max_concurrent_snapshots: config.max_concurrent_snapshots.max(1),
			pass_lock: AsyncMutex::new(()),
			sync_loop: Mutex::new(None),
		}
	}

	/// Uses `alert_rules` as the shared rule list
	pub fn with_alert_rules(mut self, alert_rules: AlertRules) -> Self {
		self.alert_rules = alert_rules;
		self
	}

	pub fn events(&self) -> &EventBus {
		&self.events
	}

	pub fn alert_rules(&self) -> &AlertRules {
		&self.alert_rules
	}

	pub fn sync_interval(&self) -> Duration {
		self.sync_interval
	}

	pub async fn register_account(&self, account: WatchedAccount) -> Result<(), IndexerError> {
		let account_id = account.id.clone();
		self.repository.add_account(account.clone()).await?;

		tracing::info!(account_id = %account_id, chain_id = %account.chain_id, "registered account");
		self.events.publish(IndexerEvent::AccountRegistered {
			account_id,
			account,
		});
		Ok(())
	}

	pub async fn unregister_account(&self, account_id: &str) -> Result<(), IndexerError> {
		self.repository.remove_account(account_id).await?;

		tracing::info!(account_id = %account_id, "unregistered account");
		self.events.publish(IndexerEvent::AccountUnregistered {
			account_id: account_id.to_string(),
		});
		Ok(())
	}

	/// Reads the current balance of an account and records it.
	///
	/// Balance source failures are published as `snapshot:error` before they are
	/// returned. A persisted snapshot is followed by `snapshot:created` and then
	/// by movement evaluation against the snapshot that preceded it.
	pub async fn create_snapshot(&self, account_id: &str) -> Result<BalanceSnapshot, IndexerError> {
		let account = self
			.repository
			.get_account(account_id)
			.await?
			.ok_or_else(|| IndexerError::account_not_found(account_id, None))?;

		let source = self.balance_source.as_ref().ok_or_else(|| {
			IndexerError::source_unconfigured(
				"No balance source configured",
				None,
				Some(HashMap::from([(
					"account_id".to_string(),
					account_id.to_string(),
				)])),
			)
		})?;

		let balance = match source.get_balance(&account.address, &account.chain_id).await {
			Ok(balance) => balance,
			Err(source_error) => {
				let error = IndexerError::from(source_error);
				self.report_snapshot_error(account_id, &error);
				return Err(error);
			}
		};

		let snapshot = BalanceSnapshot {
			account_id: account.id.clone(),
			chain_id: account.chain_id.clone(),
			balance,
			timestamp: Utc::now().timestamp_millis(),
			block_number: None,
			tx_hash: None,
		};

		let previous = self.repository.save_snapshot(snapshot.clone()).await?;

		tracing::debug!(account_id = %account_id, balance = %snapshot.balance, "snapshot created");
		self.events.publish(IndexerEvent::SnapshotCreated {
			account_id: account_id.to_string(),
			snapshot: snapshot.clone(),
		});

		if let Some(previous) = previous {
			self.evaluate_movement(&previous, &snapshot).await;
		}

		Ok(snapshot)
	}

	async fn evaluate_movement(&self, previous: &BalanceSnapshot, current: &BalanceSnapshot) {
		let Some(delta) = compute_delta(previous, current) else {
			return;
		};

		if !is_significant(&delta, &self.thresholds) {
			tracing::debug!(
				account_id = %delta.account_id,
				delta = %delta.delta,
				percentage_change = %delta.percentage_change,
				"movement below significance thresholds"
			);
			return;
		}

		let matched_rule = self
			.alert_rules
			.find_match(&delta.account_id, &delta.delta)
			.await;

		self.events.publish(IndexerEvent::SignificantMovement {
			account_id: delta.account_id.clone(),
			delta: delta.clone(),
			matched_rule: matched_rule.clone(),
		});

		if let Some(rule) = matched_rule.filter(|rule| rule.enabled) {
			self.events.publish(IndexerEvent::AlertTriggered {
				account_id: delta.account_id.clone(),
				rule,
				delta,
			});
		}
	}

	fn report_snapshot_error(&self, account_id: &str, error: &IndexerError) {
		self.events.publish(IndexerEvent::SnapshotError {
			account_id: account_id.to_string(),
			error: error.to_string(),
			trace_id: error.trace_id(),
		});
	}

	/// Takes a snapshot of every watched account.
	///
	/// Account failures are isolated: each is published as one `snapshot:error`
	/// and the pass goes on. Only a failure to list the accounts is returned.
	/// Overlapping calls run one after the other.
	pub async fn sync_all(&self) -> Result<Vec<BalanceSnapshot>, IndexerError> {
		let _pass = self.pass_lock.lock().await;

		let accounts = self.repository.get_all_accounts().await?;
		self.events.publish(IndexerEvent::SyncStart {
			account_count: accounts.len(),
		});

		let snapshots: Vec<BalanceSnapshot> = stream::iter(accounts)
			.map(|account| async move {
				match self.create_snapshot(&account.id).await {
					Ok(snapshot) => Some(snapshot),
					Err(error) => {
						tracing::warn!(account_id = %account.id, "failed to sync account: {}", error);
						// Provider failures were already reported by create_snapshot
						if !matches!(error, IndexerError::ProviderError(_)) {
							self.report_snapshot_error(&account.id, &error);
						}
						None
					}
				}
			})
			.buffer_unordered(self.max_concurrent_snapshots)
			.filter_map(|snapshot| async move { snapshot })
			.collect()
			.await;

		self.events.publish(IndexerEvent::SyncComplete {
			snapshot_count: snapshots.len(),
		});
		Ok(snapshots)
	}

	fn sync_loop_guard(&self) -> MutexGuard<'_, Option<SyncLoop>> {
		match self.sync_loop.lock() {
			Ok(guard) => guard,
			Err(poisoned) => poisoned.into_inner(),
		}
	}

	pub fn is_running(&self) -> bool {
		self.sync_loop_guard().is_some()
	}

	/// Starts the periodic sync loop.
	///
	/// The first pass runs immediately, later passes every `interval` (the
	/// configured interval when `None`). Returns `false` and changes nothing if
	/// the loop is already running. Must be called from within a tokio runtime.
	pub fn start(self: &Arc<Self>, interval: Option<Duration>) -> bool {
		let mut sync_loop = self.sync_loop_guard();
		if sync_loop.is_some() {
			tracing::warn!("Periodic sync is already running");
			return false;
		}

		let period = interval
			.filter(|interval| !interval.is_zero())
			.unwrap_or(self.sync_interval);
		let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
		let service = Arc::clone(self);

		self.events.publish(IndexerEvent::SyncStarted {
			interval_ms: u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
		});
		tracing::info!("Starting periodic sync every {:?}", period);

		let handle = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

			loop {
				tokio::select! {
					biased;
					_ = shutdown_rx.changed() => break,
					_ = ticker.tick() => {
						if *shutdown_rx.borrow() {
							break;
						}
						if let Err(error) = service.sync_all().await {
							tracing::error!("Sync pass failed: {}", error);
							service.events.publish(IndexerEvent::SyncError {
								error: error.to_string(),
								trace_id: error.trace_id(),
							});
						}
					}
				}
			}
			tracing::debug!("Periodic sync loop exited");
		});

		*sync_loop = Some(SyncLoop {
			shutdown_tx,
			_handle: handle,
		});
		true
	}

	/// Stops the periodic sync loop.
	///
	/// A pass that is already running completes and still publishes its events.
	/// Returns `false` if the loop was not running.
	pub fn stop(&self) -> bool {
		let Some(sync_loop) = self.sync_loop_guard().take() else {
			return false;
		};

		let _ = sync_loop.shutdown_tx.send(true);
		tracing::info!("Stopped periodic sync");
		self.events.publish(IndexerEvent::SyncStopped);
		true
	}

	pub async fn get_all_accounts(&self) -> Result<Vec<WatchedAccount>, IndexerError> {
		Ok(self.repository.get_all_accounts().await?)
	}

	/// Most recent snapshots of an account, oldest first (50 when `limit` is `None`)
	pub async fn get_account_history(
		&self,
		account_id: &str,
		limit: Option<usize>,
	) -> Result<Vec<BalanceSnapshot>, IndexerError> {
		Ok(self
			.repository
			.get_snapshot_history(account_id, Some(limit.unwrap_or(DEFAULT_HISTORY_LIMIT)))
			.await?)
	}

	pub async fn get_latest_snapshot(
		&self,
		account_id: &str,
	) -> Result<Option<BalanceSnapshot>, IndexerError> {
		Ok(self.repository.get_latest_snapshot(account_id).await?)
	}
}
