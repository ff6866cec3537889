//! Treasury wallet indexing and movement detection.
//!
//! This library samples the native balance of watched accounts across chains,
//! keeps a bounded snapshot history per account and reports significant
//! movements and matching alert rules as events. It includes:
//!
//! - Configuration management through JSON files
//! - A pluggable balance source with an EVM JSON-RPC implementation
//! - An in-memory snapshot store with FIFO eviction
//! - A periodic sync loop with bounded concurrency
//!
//! # Module Structure
//!
//! - `bootstrap`: Bootstraps the application
//! - `models`: Data structures for configuration, balances and alerts
//! - `repositories`: Configuration loading and snapshot storage
//! - `services`: Balance sources and the indexing orchestrator
//! - `utils`: Common utilities and helper functions

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
