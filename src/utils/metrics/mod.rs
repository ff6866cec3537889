//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines the indexer metrics and feeds them from [`IndexerEvent`]s.

pub mod server;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::services::indexer::IndexerEvent;

lazy_static! {
	/// Global Prometheus registry.
	///
	/// This registry holds all metrics defined in this module and is used
	/// to gather metrics for exposure via the metrics endpoint.
	pub static ref REGISTRY: Registry = Registry::new();

	/// Number of accounts currently registered with the indexer.
	pub static ref WATCHED_ACCOUNTS: IntGauge = {
		let gauge = IntGauge::new("watched_accounts", "Number of watched accounts").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Snapshots persisted, labelled by chain id.
	pub static ref SNAPSHOTS_TOTAL: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("snapshots_total", "Balance snapshots taken per chain"),
			&["chain"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Snapshot attempts that failed.
	pub static ref SNAPSHOT_ERRORS_TOTAL: IntCounter = {
		let counter = IntCounter::new("snapshot_errors_total", "Failed snapshot attempts").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Deltas that crossed a significance threshold.
	pub static ref SIGNIFICANT_MOVEMENTS_TOTAL: IntCounter = {
		let counter = IntCounter::new(
			"significant_movements_total",
			"Balance movements that crossed a significance threshold"
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Alerts raised, labelled by the matched rule's delivery channel.
	pub static ref ALERTS_TRIGGERED_TOTAL: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("alerts_triggered_total", "Alerts triggered per channel"),
			&["channel"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Completed sync passes.
	pub static ref SYNC_PASSES_TOTAL: IntCounter = {
		let counter = IntCounter::new("sync_passes_total", "Completed sync passes").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Successful snapshots in the most recent sync pass.
	pub static ref LAST_SYNC_SNAPSHOT_COUNT: IntGauge = {
		let gauge = IntGauge::new(
			"last_sync_snapshot_count",
			"Snapshots taken by the most recent sync pass"
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};
}

// Serializes tests that touch the global registry
#[cfg(test)]
lazy_static! {
	pub(crate) static ref TEST_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

/// Sets the watched account gauge to an absolute value.
pub fn set_watched_accounts(count: usize) {
	WATCHED_ACCOUNTS.set(i64::try_from(count).unwrap_or(i64::MAX));
}

/// Applies a single indexer event to the metrics.
pub fn record_event(event: &IndexerEvent) {
	match event {
		IndexerEvent::AccountRegistered { .. } => WATCHED_ACCOUNTS.inc(),
		IndexerEvent::AccountUnregistered { .. } => WATCHED_ACCOUNTS.dec(),
		IndexerEvent::SnapshotCreated { snapshot, .. } => {
			SNAPSHOTS_TOTAL
				.with_label_values(&[snapshot.chain_id.as_str()])
				.inc();
		}
		IndexerEvent::SnapshotError { .. } => SNAPSHOT_ERRORS_TOTAL.inc(),
		IndexerEvent::SignificantMovement { .. } => SIGNIFICANT_MOVEMENTS_TOTAL.inc(),
		IndexerEvent::AlertTriggered { rule, .. } => {
			ALERTS_TRIGGERED_TOTAL
				.with_label_values(&[rule.channel.as_str()])
				.inc();
		}
		IndexerEvent::SyncComplete { snapshot_count } => {
			SYNC_PASSES_TOTAL.inc();
			LAST_SYNC_SNAPSHOT_COUNT.set(i64::try_from(*snapshot_count).unwrap_or(i64::MAX));
		}
		IndexerEvent::SyncStarted { .. }
		| IndexerEvent::SyncStopped
		| IndexerEvent::SyncStart { .. }
		| IndexerEvent::SyncError { .. } => {}
	}
}
