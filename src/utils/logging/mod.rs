//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_DATA_DIR: directory for log files; default is "logs/"
//! - LOG_MAX_SIZE: maximum size of log files in bytes; default is 1GB
//! - IN_DOCKER: "true" if running in Docker; default is "false"

pub mod error;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
	env,
	fs::{create_dir_all, metadata},
	path::Path,
};
use tracing::{info, Subscriber};
use tracing_subscriber::{
	filter::EnvFilter,
	fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
	prelude::*,
	registry::LookupSpan,
};

const DEFAULT_LOG_MAX_SIZE: u64 = 1_073_741_824;
const LOG_FILE_NAME: &str = "indexer.log";

lazy_static! {
	static ref ANSI_ESCAPE: Option<Regex> = Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").ok();
}

/// Formatter wrapper that removes ANSI colour codes before writing to a file
struct StripAnsiFormatter<T> {
	inner: T,
}

impl<T> StripAnsiFormatter<T> {
	fn new(inner: T) -> Self {
		Self { inner }
	}
}

impl<S, N, T> FormatEvent<S, N> for StripAnsiFormatter<T>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
	T: FormatEvent<S, N>,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &tracing::Event<'_>,
	) -> std::fmt::Result {
		let mut buf = String::new();
		self.inner.format_event(ctx, Writer::new(&mut buf), event)?;
		write!(writer, "{}", strip_ansi_escapes(&buf))
	}
}

fn strip_ansi_escapes(s: &str) -> String {
	match ANSI_ESCAPE.as_ref() {
		Some(re) => re.replace_all(s, "").into_owned(),
		None => s.to_string(),
	}
}

/// Computes the path of the rolled log file given the base file path and the date string.
pub fn compute_rolled_file_path(base_file_path: &str, date_str: &str, index: u32) -> String {
	let trimmed = base_file_path
		.strip_suffix(".log")
		.unwrap_or(base_file_path);
	format!("{}-{}.{}.log", trimmed, date_str, index)
}

/// Returns the first rolled file path for `date_str` that does not exist yet or is
/// still below `max_size` bytes, starting from `file_path`.
pub fn space_based_rolling(
	file_path: &str,
	base_file_path: &str,
	date_str: &str,
	max_size: u64,
) -> String {
	let mut final_path = file_path.to_string();
	let mut index = 1;
	while let Ok(meta) = metadata(&final_path) {
		if meta.len() <= max_size {
			break;
		}
		index += 1;
		final_path = compute_rolled_file_path(base_file_path, date_str, index);
	}
	final_path
}

fn create_log_format(with_ansi: bool) -> fmt::format::Format<fmt::format::Compact> {
	fmt::format()
		.with_level(true)
		.with_target(true)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_ansi(with_ansi)
		.compact()
}

fn parse_level(log_level: &str) -> tracing::Level {
	match log_level.to_lowercase().as_str() {
		"trace" => tracing::Level::TRACE,
		"debug" => tracing::Level::DEBUG,
		"warn" => tracing::Level::WARN,
		"error" => tracing::Level::ERROR,
		_ => tracing::Level::INFO,
	}
}

fn resolve_log_dir() -> String {
	let in_docker = env::var("IN_DOCKER").map(|v| v == "true").unwrap_or(false);
	let log_dir = if in_docker {
		"logs/".to_string()
	} else {
		env::var("LOG_DATA_DIR").unwrap_or_else(|_| "logs/".to_string())
	};
	format!("{}/", log_dir.trim_end_matches('/'))
}

/// Sets up logging by reading configuration from environment variables.
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
	let log_mode = env::var("LOG_MODE")
		.unwrap_or_else(|_| "stdout".to_string())
		.to_lowercase();
	let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

	let format = create_log_format(log_mode != "file");
	let subscriber =
		tracing_subscriber::registry().with(EnvFilter::new(parse_level(&log_level).to_string()));

	if log_mode == "file" {
		let log_dir = resolve_log_dir();
		let date_str = Utc::now().format("%Y-%m-%d").to_string();
		let base_file_path = format!("{}{}", log_dir, LOG_FILE_NAME);
		let time_based_path = compute_rolled_file_path(&base_file_path, &date_str, 1);

		if let Some(parent) = Path::new(&time_based_path).parent() {
			create_dir_all(parent)?;
		}

		let max_size = parse_log_max_size()?;
		let final_path =
			space_based_rolling(&time_based_path, &base_file_path, &date_str, max_size);

		let file_appender = tracing_appender::rolling::never(
			Path::new(&final_path).parent().unwrap_or(Path::new(".")),
			Path::new(&final_path).file_name().unwrap_or_default(),
		);

		subscriber
			.with(
				fmt::layer()
					.event_format(StripAnsiFormatter::new(format))
					.with_writer(file_appender)
					.fmt_fields(fmt::format::PrettyFields::new()),
			)
			.try_init()?;

		info!(path = %final_path, "Logging to file");
	} else {
		subscriber
			.with(
				fmt::layer()
					.event_format(format)
					.fmt_fields(fmt::format::PrettyFields::new()),
			)
			.try_init()?;
	}

	info!("Logging is successfully configured (mode: {})", log_mode);
	Ok(())
}

fn parse_log_max_size() -> Result<u64, String> {
	match env::var("LOG_MAX_SIZE") {
		Ok(value) => value
			.parse::<u64>()
			.map_err(|_| format!("LOG_MAX_SIZE must be a valid u64, got '{}'", value)),
		Err(_) => Ok(DEFAULT_LOG_MAX_SIZE),
	}
}
