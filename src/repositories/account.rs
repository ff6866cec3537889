//! Watched account and snapshot storage.
//!
//! [`AccountRepositoryTrait`] is the contract the indexer persists through.
//! [`InMemoryAccountRepository`] keeps accounts in registration order and a
//! bounded FIFO history of snapshots per account.

#![allow(clippy::result_large_err)]

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
	models::{BalanceSnapshot, WatchedAccount, DEFAULT_HISTORY_CAPACITY},
	repositories::error::RepositoryError,
};

/// Number of snapshots returned by history reads that do not name a limit
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Interface for account and snapshot storage
///
/// Every mutation is atomic on its own. Nothing spans more than one account.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
	/// Stores a new account with an empty history
	///
	/// Fails with `DuplicateAccount` if the id is already present.
	async fn add_account(&self, account: WatchedAccount) -> Result<(), RepositoryError>;

	/// Removes an account together with its history
	///
	/// Fails with `AccountNotFound` if the id is unknown.
	async fn remove_account(&self, account_id: &str) -> Result<(), RepositoryError>;

	/// Returns every stored account
	async fn get_all_accounts(&self) -> Result<Vec<WatchedAccount>, RepositoryError>;

	/// Returns the account, or `None` if it is not stored
	async fn get_account(&self, account_id: &str)
		-> Result<Option<WatchedAccount>, RepositoryError>;

	/// Appends a snapshot to the owning account's history
	///
	/// Returns the snapshot it was appended after, read under the same write
	/// as the append, so concurrent saves for one account each see a distinct
	/// predecessor. Evicts the oldest entry once the history is over capacity.
	/// Fails with `AccountNotFound` if the account is gone.
	async fn save_snapshot(
		&self,
		snapshot: BalanceSnapshot,
	) -> Result<Option<BalanceSnapshot>, RepositoryError>;

	/// Returns the most recent snapshot of an account
	async fn get_latest_snapshot(
		&self,
		account_id: &str,
	) -> Result<Option<BalanceSnapshot>, RepositoryError>;

	/// Returns the most recent `limit` snapshots, oldest first
	///
	/// `None` returns the whole retained history. Unknown accounts have an
	/// empty history.
	async fn get_snapshot_history(
		&self,
		account_id: &str,
		limit: Option<usize>,
	) -> Result<Vec<BalanceSnapshot>, RepositoryError>;
}

#[derive(Default)]
struct StoreState {
	/// Account ids in registration order
	order: Vec<String>,
	accounts: HashMap<String, WatchedAccount>,
	histories: HashMap<String, VecDeque<BalanceSnapshot>>,
}

/// Account store kept entirely in memory
///
/// Accounts and histories share one lock, so registration, removal and
/// snapshot appends never observe each other half-done.
pub struct InMemoryAccountRepository {
	state: RwLock<StoreState>,
	history_capacity: usize,
}

impl InMemoryAccountRepository {
	pub fn new() -> Self {
		Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
	}

	/// Creates a store that keeps at most `history_capacity` snapshots per account
	pub fn with_history_capacity(history_capacity: usize) -> Self {
		Self {
			state: RwLock::new(StoreState::default()),
			history_capacity: history_capacity.max(1),
		}
	}

	pub fn history_capacity(&self) -> usize {
		self.history_capacity
	}
}

impl Default for InMemoryAccountRepository {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl AccountRepositoryTrait for InMemoryAccountRepository {
	async fn add_account(&self, account: WatchedAccount) -> Result<(), RepositoryError> {
		let mut state = self.state.write().await;
		if state.accounts.contains_key(&account.id) {
			return Err(RepositoryError::duplicate_account(&account.id, None));
		}

		state.order.push(account.id.clone());
		state.histories.insert(account.id.clone(), VecDeque::new());
		state.accounts.insert(account.id.clone(), account);
		Ok(())
	}

	async fn remove_account(&self, account_id: &str) -> Result<(), RepositoryError> {
		let mut state = self.state.write().await;
		if state.accounts.remove(account_id).is_none() {
			return Err(RepositoryError::account_not_found(account_id, None));
		}

		state.histories.remove(account_id);
		state.order.retain(|id| id != account_id);
		Ok(())
	}

	async fn get_all_accounts(&self) -> Result<Vec<WatchedAccount>, RepositoryError> {
		let state = self.state.read().await;
		Ok(state
			.order
			.iter()
			.filter_map(|id| state.accounts.get(id).cloned())
			.collect())
	}

	async fn get_account(
		&self,
		account_id: &str,
	) -> Result<Option<WatchedAccount>, RepositoryError> {
		Ok(self.state.read().await.accounts.get(account_id).cloned())
	}

	async fn save_snapshot(
		&self,
		snapshot: BalanceSnapshot,
	) -> Result<Option<BalanceSnapshot>, RepositoryError> {
		let mut state = self.state.write().await;
		let Some(history) = state.histories.get_mut(&snapshot.account_id) else {
			return Err(RepositoryError::account_not_found(
				&snapshot.account_id,
				Some(HashMap::from([(
					"operation".to_string(),
					"save_snapshot".to_string(),
				)])),
			));
		};

		let previous = history.back().cloned();
		history.push_back(snapshot);
		while history.len() > self.history_capacity {
			history.pop_front();
		}
		Ok(previous)
	}

	async fn get_latest_snapshot(
		&self,
		account_id: &str,
	) -> Result<Option<BalanceSnapshot>, RepositoryError> {
		let state = self.state.read().await;
		Ok(state
			.histories
			.get(account_id)
			.and_then(|history| history.back().cloned()))
	}

	async fn get_snapshot_history(
		&self,
		account_id: &str,
		limit: Option<usize>,
	) -> Result<Vec<BalanceSnapshot>, RepositoryError> {
		let state = self.state.read().await;
		let Some(history) = state.histories.get(account_id) else {
			return Ok(Vec::new());
		};

		let skip = limit.map_or(0, |limit| history.len().saturating_sub(limit));
		Ok(history.iter().skip(skip).cloned().collect())
	}
}
