//! Configuration for the fulfillment service.
//!
//! Configuration is TOML. `${VAR}` and `${VAR:-default}` references are
//! replaced with environment values before parsing, and the parsed result is
//! validated before it is handed out.

use fulfillment_types::{default_board_columns, BoardColumn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound for `board.delivered_window_days`, roughly ten years.
const MAX_DELIVERED_WINDOW_DAYS: u32 = 3650;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default rendering echoes the whole input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// The seller account whose orders are managed.
	pub account: AccountConfig,
	/// Which Order Service backend to talk to.
	pub order_service: OrderServiceConfig,
	/// Board layout and polling.
	#[serde(default)]
	pub board: BoardConfig,
}

/// Seller account identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Warehouse account id sent with every Order Service request.
	pub wh_account_id: String,
}

/// Configuration for the Order Service backends.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderServiceConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of implementation names to their raw TOML tables. Each backend
	/// validates its own table.
	pub implementations: HashMap<String, toml::Value>,
}

impl OrderServiceConfig {
	/// The table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Board layout and polling behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardConfig {
	/// Seconds between polls while driver orders are active.
	#[serde(default = "default_polling_interval_seconds")]
	pub polling_interval_seconds: u64,
	/// Orders per page in list output.
	#[serde(default = "default_page_size")]
	pub page_size: usize,
	/// Delivered orders older than this many days are hidden from the board.
	/// Zero disables the window.
	#[serde(default = "default_delivered_window_days")]
	pub delivered_window_days: u32,
	/// Board columns in display order.
	#[serde(default = "default_board_columns")]
	pub columns: Vec<BoardColumn>,
}

impl Default for BoardConfig {
	fn default() -> Self {
		Self {
			polling_interval_seconds: default_polling_interval_seconds(),
			page_size: default_page_size(),
			delivered_window_days: default_delivered_window_days(),
			columns: default_board_columns(),
		}
	}
}

fn default_polling_interval_seconds() -> u64 {
	30
}

fn default_page_size() -> usize {
	10
}

fn default_delivered_window_days() -> u32 {
	7
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match (std::env::var(var_name.as_str()), default_value) {
			(Ok(v), _) => v,
			(Err(_), Some(default)) => default.to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					var_name.as_str()
				)));
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Checks cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.account.wh_account_id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"account.wh_account_id cannot be empty".into(),
			));
		}

		if self.order_service.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one order_service implementation must be configured".into(),
			));
		}
		if self.order_service.primary.is_empty() {
			return Err(ConfigError::Validation(
				"order_service.primary cannot be empty".into(),
			));
		}
		if self.order_service.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary order service '{}' not found in implementations",
				self.order_service.primary
			)));
		}

		let board = &self.board;
		if !(1..=3600).contains(&board.polling_interval_seconds) {
			return Err(ConfigError::Validation(format!(
				"board.polling_interval_seconds must be between 1 and 3600, got {}",
				board.polling_interval_seconds
			)));
		}
		if !(1..=1000).contains(&board.page_size) {
			return Err(ConfigError::Validation(format!(
				"board.page_size must be between 1 and 1000, got {}",
				board.page_size
			)));
		}

		if board.delivered_window_days > MAX_DELIVERED_WINDOW_DAYS {
			return Err(ConfigError::Validation(format!(
				"board.delivered_window_days must be at most {}, got {}",
				MAX_DELIVERED_WINDOW_DAYS, board.delivered_window_days
			)));
		}

		let mut seen = HashSet::new();
		for column in &board.columns {
			if !seen.insert(column.id) {
				return Err(ConfigError::Validation(format!(
					"Duplicate board column '{}'",
					column.id
				)));
			}
		}
		if !board.columns.iter().any(|column| column.visible) {
			return Err(ConfigError::Validation(
				"At least one board column must be visible".into(),
			));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string. Environment variables are
/// resolved first and the result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
