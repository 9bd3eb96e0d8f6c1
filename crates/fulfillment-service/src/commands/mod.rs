//! Subcommands of the `fulfillment` binary.

mod orders;
mod render;
mod status;
mod watch;

use clap::{Args, Subcommand};
use fulfillment_config::Config;
use fulfillment_orders::OrderService;
use fulfillment_types::{BucketFilter, OrderId, RequestedColumn};
use std::path::PathBuf;
use std::time::Duration;

pub use watch::poll_until_settled;

#[derive(Subcommand, Debug)]
pub enum Command {
	/// List orders with per-bucket counts
	List(ListArgs),
	/// Show orders grouped into the board columns
	Board {
		/// Match against order id, customer name or phone
		#[arg(long)]
		search: Option<String>,
	},
	/// Check whether an order may move to a column, without changing it
	Check {
		order_id: OrderId,
		column: RequestedColumn,
		/// Customer signature image, needed to check deliveries
		#[arg(long)]
		signature: Option<PathBuf>,
	},
	/// Move an order to the next column
	Advance {
		order_id: OrderId,
		column: RequestedColumn,
		#[command(flatten)]
		evidence: EvidenceArgs,
	},
	/// Cancel an order
	Cancel { order_id: OrderId },
	/// Poll while driver orders are in progress and print state changes
	Watch,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
	/// Bucket to show: all, pending, accepted, packed, in_transit, delivered, cancelled
	#[arg(long, default_value = "all")]
	pub bucket: BucketFilter,
	/// Match against order id, customer name or phone
	#[arg(long)]
	pub search: Option<String>,
	/// 1-based page number
	#[arg(long, default_value_t = 1)]
	pub page: usize,
}

/// Proof of delivery for self-delivered orders.
#[derive(Args, Debug, Clone, Default)]
pub struct EvidenceArgs {
	/// Customer signature image
	#[arg(long)]
	pub signature: Option<PathBuf>,
	/// Photo of the delivered package
	#[arg(long)]
	pub proof: Option<PathBuf>,
	/// Who received the package
	#[arg(long)]
	pub received_by: Option<String>,
	#[arg(long)]
	pub note: Option<String>,
	/// The recipient appeared intoxicated
	#[arg(long)]
	pub visibly_intoxicated: bool,
}

/// Runs `command` and prints its output.
pub async fn run(
	command: Command,
	config: &Config,
	service: &OrderService,
) -> Result<(), Box<dyn std::error::Error>> {
	let output = match command {
		Command::List(args) => orders::list(service, &config.board, &args).await?,
		Command::Board { search } => {
			let today = chrono::Local::now().date_naive();
			orders::board(service, &config.board, search.as_deref(), today).await?
		},
		Command::Check {
			order_id,
			column,
			signature,
		} => status::check(service, &order_id, column, signature.as_deref()).await?,
		Command::Advance {
			order_id,
			column,
			evidence,
		} => status::advance(service, &order_id, column, &evidence).await?,
		Command::Cancel { order_id } => status::cancel(service, &order_id).await?,
		Command::Watch => {
			let interval = Duration::from_secs(config.board.polling_interval_seconds);
			tokio::select! {
				polls = poll_until_settled(service, interval, |change| println!("{}", render::change(change))) => {
					format!("No driver orders in progress after {} poll(s)", polls)
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Interrupted");
					"Stopped".to_string()
				}
			}
		},
	};
	println!("{}", output.trim_end());
	Ok(())
}
