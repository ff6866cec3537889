//! Parsing helpers shared by the CLI and the configuration loaders.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a human-readable size such as "1GB", "500MB" or "1KiB" into bytes.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s)
		.map(|byte| byte.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}

/// Canonical form of an identifier or hex address for duplicate detection.
///
/// Chain ids and EVM addresses compare case-insensitively, so `0xAbC` and
/// `0xabc` are the same wallet.
pub fn normalize_identifier(input: &str) -> String {
	input.trim().to_lowercase()
}
