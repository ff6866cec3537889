//! Utility modules for common functionality.
//!
//! This module provides various utility functions and types that are used across
//! the application. Currently includes:
//!
//! - http: HTTP client utilities (i.e. creation retryable HTTP clients)
//! - logging: Logging utilities
//! - metrics: Metrics utilities
//! - parsing: Parsing utilities
//! - tests: Test utilities

pub mod http;
pub mod logging;
pub mod metrics;
pub mod parsing;

pub use http::*;
pub use parsing::*;
