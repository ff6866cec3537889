//! Indexer error types.
//!
//! Store errors convert without changing kind or trace id, so a duplicate
//! registration reads the same whether it is caught at the store or at the
//! indexer.

use crate::{
	repositories::RepositoryError,
	services::balance::BalanceSourceError,
	utils::logging::error::{ErrorContext, TraceableError},
};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur during indexing operations
#[derive(ThisError, Debug)]
pub enum IndexerError {
	/// Registration of an id that is already watched
	#[error("Duplicate account: {0}")]
	DuplicateAccount(ErrorContext),

	/// Operation on an id that is not watched
	#[error("Account not found: {0}")]
	AccountNotFound(ErrorContext),

	/// Snapshot requested while no balance source is configured
	#[error("Balance source unconfigured: {0}")]
	SourceUnconfigured(ErrorContext),

	/// The balance source failed
	#[error("Provider error: {0}")]
	ProviderError(ErrorContext),

	/// Any other store failure
	#[error("Repository error: {0}")]
	RepositoryError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl IndexerError {
	pub fn account_not_found(account_id: &str, metadata: Option<HashMap<String, String>>) -> Self {
		let mut metadata = metadata.unwrap_or_default();
		metadata.insert("account_id".to_string(), account_id.to_string());
		Self::AccountNotFound(ErrorContext::new_with_log(
			format!("account '{}' does not exist", account_id),
			None,
			Some(metadata),
		))
	}

	pub fn source_unconfigured(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::SourceUnconfigured(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn provider_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ProviderError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn repository_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RepositoryError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl From<RepositoryError> for IndexerError {
	fn from(error: RepositoryError) -> Self {
		match error {
			RepositoryError::DuplicateAccount(ctx) => Self::DuplicateAccount(ctx),
			RepositoryError::AccountNotFound(ctx) => Self::AccountNotFound(ctx),
			other => Self::RepositoryError(ErrorContext::new(
				"Snapshot store operation failed",
				Some(Box::new(other)),
				None,
			)),
		}
	}
}

impl From<BalanceSourceError> for IndexerError {
	fn from(error: BalanceSourceError) -> Self {
		Self::ProviderError(ErrorContext::new(
			format!("Balance source failed: {}", error),
			Some(Box::new(error)),
			None,
		))
	}
}

impl TraceableError for IndexerError {
	fn trace_id(&self) -> String {
		match self {
			Self::DuplicateAccount(ctx) => ctx.trace_id.clone(),
			Self::AccountNotFound(ctx) => ctx.trace_id.clone(),
			Self::SourceUnconfigured(ctx) => ctx.trace_id.clone(),
			Self::ProviderError(ctx) => ctx.trace_id.clone(),
			Self::RepositoryError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
