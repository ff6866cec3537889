//! Core services implementing the business logic.
//!
//! - `balance`: Balance source contract and the EVM JSON-RPC implementation
//! - `indexer`: Snapshot orchestration, movement evaluation and alert matching

pub mod balance;
pub mod indexer;
