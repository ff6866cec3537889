//! Wallet indexing and movement detection.
//!
//! - `service`: the orchestrator (registration, snapshots, sync loop)
//! - `movement`: delta computation and significance
//! - `matcher`: first-match alert rule selection
//! - `events`: event enum and broadcast bus

mod error;
mod events;
mod matcher;
mod movement;
mod service;

pub use error::IndexerError;
pub use events::{EventBus, IndexerEvent, DEFAULT_EVENT_CAPACITY};
pub use matcher::{find_matching_rule, rule_condition_holds, AlertRules};
pub use movement::{compute_delta, is_significant, MovementThresholds};
pub use service::WalletIndexerService;
