//! Main entry point for the `fulfillment` command-line tool.
//!
//! Lists, groups, advances, cancels and watches the orders of one seller
//! account. Order state is always derived from a fresh fetch; status changes
//! are validated locally before they are sent to the Order Service.

use clap::Parser;
use fulfillment_config::Config;
use std::path::PathBuf;

mod commands;
mod factory_registry;

use commands::Command;

/// Command-line arguments for the fulfillment tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	// RUST_LOG wins over --log-level
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// Logs go to stderr so command output stays pipeable
	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		account = %config.account.wh_account_id,
		"Loaded configuration from {}",
		args.config.display()
	);

	let service = factory_registry::build_order_service(&config)?;
	commands::run(args.command, &config, &service).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_types::{BucketFilter, RequestedColumn};

	#[test]
	fn test_args_defaults() {
		let args = Args::try_parse_from(["fulfillment", "watch"]).unwrap();
		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
		assert!(matches!(args.command, Command::Watch));
	}

	#[test]
	fn test_list_args() {
		let args = Args::try_parse_from([
			"fulfillment",
			"-c",
			"custom.toml",
			"list",
			"--bucket",
			"shipped",
			"--page",
			"3",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("custom.toml"));
		match args.command {
			Command::List(list) => {
				assert_eq!(list.bucket, BucketFilter::Only(RequestedColumn::InTransit));
				assert_eq!(list.page, 3);
				assert!(list.search.is_none());
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_advance_args() {
		let args = Args::try_parse_from([
			"fulfillment",
			"advance",
			"1001",
			"delivered",
			"--signature",
			"sig.png",
			"--received-by",
			"Front desk",
			"--visibly-intoxicated",
		])
		.unwrap();

		match args.command {
			Command::Advance {
				order_id,
				column,
				evidence,
			} => {
				assert_eq!(order_id.as_str(), "1001");
				assert_eq!(column, RequestedColumn::Delivered);
				assert_eq!(evidence.signature, Some(PathBuf::from("sig.png")));
				assert_eq!(evidence.received_by.as_deref(), Some("Front desk"));
				assert!(evidence.visibly_intoxicated);
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_unknown_column_rejected() {
		assert!(Args::try_parse_from(["fulfillment", "check", "1", "archived"]).is_err());
	}

	#[tokio::test]
	async fn test_end_to_end_with_memory_fixture() {
		let dir = tempfile::tempdir().unwrap();
		let fixture = dir.path().join("orders.json");
		std::fs::write(&fixture, r#"{"orders": [{"order_id": 5, "accepted": "Y"}]}"#).unwrap();

		let config_path = dir.path().join("config.toml");
		std::fs::write(
			&config_path,
			format!(
				"[account]\nwh_account_id = \"42\"\n\n[order_service]\nprimary = \"memory\"\n\n[order_service.implementations.memory]\nfixture = \"{}\"\n",
				fixture.display()
			),
		)
		.unwrap();

		let config = Config::from_file(&config_path).await.unwrap();
		let service = factory_registry::build_order_service(&config).unwrap();

		let advance = Args::try_parse_from(["fulfillment", "advance", "5", "packed"]).unwrap();
		commands::run(advance.command, &config, &service).await.unwrap();

		let order = service.fetch_order(&"5".into()).await.unwrap();
		assert_eq!(
			fulfillment_core::infer_state(&order),
			fulfillment_types::LifecycleState::Packed
		);
	}
}
