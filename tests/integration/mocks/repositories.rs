//! Mock implementations of repository traits.
//!
//! - [`MockAccountRepository`] - Mock implementation of the account repository
//! - [`YieldingRepository`] - In-memory store that yields before every call
//!
//! These mocks allow testing store failures that the in-memory repository
//! never produces, and interleavings it never exposes on its own.

use async_trait::async_trait;
use mockall::mock;
use tokio::task::yield_now;
use treasury_indexer::{
	models::{BalanceSnapshot, WatchedAccount},
	repositories::{AccountRepositoryTrait, InMemoryAccountRepository, RepositoryError},
};

mock! {
	/// Mock implementation of the account repository.
	///
	/// Provides methods to simulate account and snapshot storage for testing
	/// purposes.
	pub AccountRepository {}

	#[async_trait]
	impl AccountRepositoryTrait for AccountRepository {
		async fn add_account(&self, account: WatchedAccount) -> Result<(), RepositoryError>;
		async fn remove_account(&self, account_id: &str) -> Result<(), RepositoryError>;
		async fn get_all_accounts(&self) -> Result<Vec<WatchedAccount>, RepositoryError>;
		async fn get_account(&self, account_id: &str) -> Result<Option<WatchedAccount>, RepositoryError>;
		async fn save_snapshot(
			&self,
			snapshot: BalanceSnapshot,
		) -> Result<Option<BalanceSnapshot>, RepositoryError>;
		async fn get_latest_snapshot(&self, account_id: &str) -> Result<Option<BalanceSnapshot>, RepositoryError>;
		async fn get_snapshot_history(
			&self,
			account_id: &str,
			limit: Option<usize>,
		) -> Result<Vec<BalanceSnapshot>, RepositoryError>;
	}
}

/// In-memory store that yields to the scheduler before each operation.
///
/// Concurrent callers interleave at every store call, which surfaces any
/// read-then-write sequence that is not atomic.
#[derive(Default)]
pub struct YieldingRepository {
	inner: InMemoryAccountRepository,
}

#[async_trait]
impl AccountRepositoryTrait for YieldingRepository {
	async fn add_account(&self, account: WatchedAccount) -> Result<(), RepositoryError> {
		yield_now().await;
		self.inner.add_account(account).await
	}

	async fn remove_account(&self, account_id: &str) -> Result<(), RepositoryError> {
		yield_now().await;
		self.inner.remove_account(account_id).await
	}

	async fn get_all_accounts(&self) -> Result<Vec<WatchedAccount>, RepositoryError> {
		yield_now().await;
		self.inner.get_all_accounts().await
	}

	async fn get_account(
		&self,
		account_id: &str,
	) -> Result<Option<WatchedAccount>, RepositoryError> {
		yield_now().await;
		self.inner.get_account(account_id).await
	}

	async fn save_snapshot(
		&self,
		snapshot: BalanceSnapshot,
	) -> Result<Option<BalanceSnapshot>, RepositoryError> {
		yield_now().await;
		self.inner.save_snapshot(snapshot).await
	}

	async fn get_latest_snapshot(
		&self,
		account_id: &str,
	) -> Result<Option<BalanceSnapshot>, RepositoryError> {
		yield_now().await;
		self.inner.get_latest_snapshot(account_id).await
	}

	async fn get_snapshot_history(
		&self,
		account_id: &str,
		limit: Option<usize>,
	) -> Result<Vec<BalanceSnapshot>, RepositoryError> {
		yield_now().await;
		self.inner.get_snapshot_history(account_id, limit).await
	}
}
