//! Repository implementations.
//!
//! - Account: the snapshot store the indexer persists through, with an
//!   in-memory implementation holding a bounded history per account
//! - Chain: Loads chain profiles describing RPC endpoints and native tokens
//! - Wallet: Loads the wallets to watch, ensuring referenced chains exist
//! - Alert: Loads the ordered alert rule list, ensuring referenced wallets exist

mod account;
mod alert;
mod chain;
mod error;
mod wallet;

pub use account::{AccountRepositoryTrait, InMemoryAccountRepository, DEFAULT_HISTORY_LIMIT};
pub use alert::AlertRuleRepository;
pub use chain::{ChainRepository, ChainRepositoryTrait, ChainService};
pub use error::RepositoryError;
pub use wallet::WalletConfigRepository;
