//! Balance source error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use uuid::Uuid;

/// Represents failures of a balance lookup
#[derive(ThisError, Debug)]
pub enum BalanceSourceError {
	/// The chain is unknown to the source or of a category it cannot query
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(ErrorContext),

	/// The address is not valid for the chain
	#[error("Invalid address: {0}")]
	InvalidAddress(ErrorContext),

	/// Transport failure, non-success HTTP status or JSON-RPC error object
	#[error("Request error: {0}")]
	RequestError(ErrorContext),

	/// The node answered with something that is not a balance
	#[error("Invalid response: {0}")]
	InvalidResponse(ErrorContext),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl BalanceSourceError {
	pub fn unsupported_chain(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::UnsupportedChain(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn invalid_address(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InvalidAddress(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn request_error(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::RequestError(ErrorContext::new_with_log(msg, source, metadata))
	}

	pub fn invalid_response(
		msg: impl Into<String>,
		source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::InvalidResponse(ErrorContext::new_with_log(msg, source, metadata))
	}
}

impl TraceableError for BalanceSourceError {
	fn trace_id(&self) -> String {
		match self {
			Self::UnsupportedChain(ctx) => ctx.trace_id.clone(),
			Self::InvalidAddress(ctx) => ctx.trace_id.clone(),
			Self::RequestError(ctx) => ctx.trace_id.clone(),
			Self::InvalidResponse(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => Uuid::new_v4().to_string(),
		}
	}
}
