use alloy::primitives::U256;
use proptest::{prelude::*, test_runner::Config};
use treasury_indexer::{
	repositories::{AccountRepositoryTrait, InMemoryAccountRepository},
	utils::tests::builders::{account::AccountBuilder, snapshot::SnapshotBuilder},
};

fn runtime() -> tokio::runtime::Runtime {
	tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.unwrap()
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	// History keeps the newest `capacity` snapshots, oldest first
	#[test]
	fn test_history_cap_is_fifo(
		capacity in 1usize..10,
		balances in prop::collection::vec(any::<u64>(), 0..30),
	) {
		let history = runtime().block_on(async {
			let repository = InMemoryAccountRepository::with_history_capacity(capacity);
			repository
				.add_account(AccountBuilder::new().id("a").build())
				.await
				.unwrap();
			for (index, balance) in balances.iter().enumerate() {
				repository
					.save_snapshot(
						SnapshotBuilder::new()
							.account_id("a")
							.balance(u128::from(*balance))
							.timestamp(index as i64)
							.build(),
					)
					.await
					.unwrap();
			}
			repository.get_snapshot_history("a", None).await.unwrap()
		});

		let kept = balances.len().min(capacity);
		let expected: Vec<U256> = balances[balances.len() - kept..]
			.iter()
			.map(|balance| U256::from(*balance))
			.collect();
		let actual: Vec<U256> = history.iter().map(|snapshot| snapshot.balance).collect();
		prop_assert_eq!(actual, expected);
	}

	// A history limit returns a suffix of the full history
	#[test]
	fn test_history_limit_is_a_suffix(
		count in 0usize..20,
		limit in 0usize..25,
	) {
		let (full, limited) = runtime().block_on(async {
			let repository = InMemoryAccountRepository::new();
			repository
				.add_account(AccountBuilder::new().id("a").build())
				.await
				.unwrap();
			for index in 0..count {
				repository
					.save_snapshot(
						SnapshotBuilder::new()
							.account_id("a")
							.balance(index as u128)
							.build(),
					)
					.await
					.unwrap();
			}
			(
				repository.get_snapshot_history("a", None).await.unwrap(),
				repository.get_snapshot_history("a", Some(limit)).await.unwrap(),
			)
		});

		prop_assert_eq!(limited.len(), full.len().min(limit));
		prop_assert_eq!(&full[full.len() - limited.len()..], &limited[..]);
	}
}
