//! Polling loop for driver orders.

use fulfillment_core::{needs_polling, StatusChange, StatusTracker};
use fulfillment_orders::OrderService;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Re-fetches the order list every `interval` and reports state changes to
/// `on_change` until no driver order is in progress. A failed poll is logged
/// and retried on the next tick. Returns the number of successful polls.
pub async fn poll_until_settled<F>(service: &OrderService, interval: Duration, mut on_change: F) -> usize
where
	F: FnMut(&StatusChange),
{
	let mut tracker = StatusTracker::new();
	let mut ticker = tokio::time::interval(interval);
	let mut polls = 0;

	loop {
		ticker.tick().await;

		let orders = match service.fetch_orders().await {
			Ok(orders) => orders,
			Err(e) => {
				warn!("Poll failed: {}", e);
				continue;
			},
		};
		polls += 1;

		let changes = tracker.observe(&orders);
		debug!(polls, changes = changes.len(), "Polled orders");
		changes.iter().for_each(&mut on_change);

		if !needs_polling(&orders) {
			info!(polls, "No driver orders in progress");
			return polls;
		}
	}
}
