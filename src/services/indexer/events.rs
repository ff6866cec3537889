//! Indexer events and the broadcast bus they are published on.
//!
//! Publishing never blocks and never fails: events sent while nobody listens are
//! dropped, and a subscriber that falls more than the bus capacity behind misses
//! the oldest events.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{AlertRule, BalanceDelta, BalanceSnapshot, WatchedAccount};

/// Default number of events buffered per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// State transitions observed by the indexer
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum IndexerEvent {
	#[serde(rename = "account:registered")]
	AccountRegistered {
		account_id: String,
		account: WatchedAccount,
	},

	#[serde(rename = "account:unregistered")]
	AccountUnregistered { account_id: String },

	/// The scheduler started
	#[serde(rename = "sync:started")]
	SyncStarted { interval_ms: u64 },

	/// The scheduler stopped
	#[serde(rename = "sync:stopped")]
	SyncStopped,

	/// A pass is about to visit `account_count` accounts
	#[serde(rename = "sync:start")]
	SyncStart { account_count: usize },

	/// A pass finished with `snapshot_count` successful snapshots
	#[serde(rename = "sync:complete")]
	SyncComplete { snapshot_count: usize },

	/// A whole pass failed before it could visit the accounts
	#[serde(rename = "sync:error")]
	SyncError { error: String, trace_id: String },

	#[serde(rename = "snapshot:created")]
	SnapshotCreated {
		account_id: String,
		snapshot: BalanceSnapshot,
	},

	#[serde(rename = "snapshot:error")]
	SnapshotError {
		account_id: String,
		error: String,
		trace_id: String,
	},

	#[serde(rename = "movement:significant")]
	SignificantMovement {
		account_id: String,
		delta: BalanceDelta,
		#[serde(skip_serializing_if = "Option::is_none")]
		matched_rule: Option<AlertRule>,
	},

	#[serde(rename = "alert:triggered")]
	AlertTriggered {
		account_id: String,
		rule: AlertRule,
		delta: BalanceDelta,
	},
}

impl IndexerEvent {
	/// Wire name of the event, e.g. `"sync:start"`
	pub fn name(&self) -> &'static str {
		match self {
			Self::AccountRegistered { .. } => "account:registered",
			Self::AccountUnregistered { .. } => "account:unregistered",
			Self::SyncStarted { .. } => "sync:started",
			Self::SyncStopped => "sync:stopped",
			Self::SyncStart { .. } => "sync:start",
			Self::SyncComplete { .. } => "sync:complete",
			Self::SyncError { .. } => "sync:error",
			Self::SnapshotCreated { .. } => "snapshot:created",
			Self::SnapshotError { .. } => "snapshot:error",
			Self::SignificantMovement { .. } => "movement:significant",
			Self::AlertTriggered { .. } => "alert:triggered",
		}
	}

	/// Account the event concerns, if any
	pub fn account_id(&self) -> Option<&str> {
		match self {
			Self::AccountRegistered { account_id, .. }
			| Self::AccountUnregistered { account_id }
			| Self::SnapshotCreated { account_id, .. }
			| Self::SnapshotError { account_id, .. }
			| Self::SignificantMovement { account_id, .. }
			| Self::AlertTriggered { account_id, .. } => Some(account_id),
			_ => None,
		}
	}
}

/// Multi-subscriber channel for [`IndexerEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<IndexerEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));
		Self { sender }
	}

	/// Registers a new listener; it receives events published from now on
	pub fn subscribe(&self) -> broadcast::Receiver<IndexerEvent> {
		self.sender.subscribe()
	}

	pub fn publish(&self, event: IndexerEvent) {
		tracing::trace!(event = event.name(), "publishing indexer event");
		// No receivers is not an error
		let _ = self.sender.send(event);
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_EVENT_CAPACITY)
	}
}
