//! Error types for repository operations.
//!
//! Covers both the snapshot store (duplicate and unknown accounts) and the
//! configuration repositories (loading and cross-reference validation).

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents errors that can occur during repository operations
#[derive(ThisError, Debug)]
pub enum RepositoryError {
	/// An account with the same id is already stored
	#[error("Duplicate account: {0}")]
	DuplicateAccount(ErrorContext),

	/// No account is stored under the requested id
	#[error("Account not found: {0}")]
	AccountNotFound(ErrorContext),

	/// Errors related to validation errors
	#[error("Validation error: {0}")]
	ValidationError(ErrorContext),

	/// Errors related to load errors
	#[error("Load error: {0}")]
	LoadError(ErrorContext),

	/// Errors related to internal errors
	#[error("Internal error: {0}")]
	InternalError(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

fn with_account_id(
	account_id: &str,
	metadata: Option<HashMap<String, String>>,
) -> HashMap<String, String> {
	let mut metadata = metadata.unwrap_or_default();
	metadata.insert("account_id".to_string(), account_id.to_string());
	metadata
}

impl RepositoryError {
	pub fn duplicate_account(
		account_id: &str,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::DuplicateAccount(ErrorContext::new_with_log(
			format!("account '{}' is already registered", account_id),
			None,
			Some(with_account_id(account_id, metadata)),
		))
	}

	pub fn account_not_found(
		account_id: &str,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::AccountNotFound(ErrorContext::new_with_log(
			format!("account '{}' does not exist", account_id),
			None,
			Some(with_account_id(account_id, metadata)),
		))
	}

	// Validation error
	pub fn validation_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ValidationError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Load error
	pub fn load_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::LoadError(ErrorContext::new_with_log(msg, source, metadata))
	}

	// Internal error
	pub fn internal_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InternalError(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for RepositoryError {
	fn trace_id(&self) -> String {
		match self {
			Self::DuplicateAccount(ctx) => ctx.trace_id.clone(),
			Self::AccountNotFound(ctx) => ctx.trace_id.clone(),
			Self::ValidationError(ctx) => ctx.trace_id.clone(),
			Self::LoadError(ctx) => ctx.trace_id.clone(),
			Self::InternalError(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
