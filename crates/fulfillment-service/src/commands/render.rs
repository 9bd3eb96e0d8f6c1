//! Plain-text output for the commands.

use fulfillment_core::{infer_state, Board, BucketCounts, Page, StatusChange, TransitionVerdict};
use fulfillment_types::{BucketFilter, DeliveryType, OrderFlags, RequestedColumn};
use std::fmt::Write;

pub fn order_line(order: &OrderFlags) -> String {
	let mut line = format!(
		"#{:<8} {:<28} {:<8}",
		order.order_id.as_str(),
		infer_state(order).label(),
		order.delivery_type.to_string()
	);
	if let Some(name) = order.name.as_deref().filter(|n| !n.trim().is_empty()) {
		let _ = write!(line, " {}", name.trim());
	}
	if let Some(phone) = order.phone.as_deref().filter(|p| !p.trim().is_empty()) {
		let _ = write!(line, " ({})", phone.trim());
	}
	if order.delivery_type == DeliveryType::Driver {
		if let Some(status) = order.driver_order_status {
			let _ = write!(line, " [driver: {}]", status.label());
		}
	}
	line
}

pub fn counts_line(counts: &BucketCounts) -> String {
	let mut line = format!("All {}", counts.all);
	for column in RequestedColumn::ALL {
		let _ = write!(line, " | {} {}", column.label(), counts.get(column));
	}
	line
}

pub fn list(page: &Page<OrderFlags>, counts: &BucketCounts, bucket: BucketFilter) -> String {
	let mut out = counts_line(counts);
	out.push('\n');

	let heading = match bucket {
		BucketFilter::All => "All orders".to_string(),
		BucketFilter::Only(column) => format!("{} orders", column.label()),
	};
	let _ = writeln!(
		out,
		"{} (page {} of {}, {} total)",
		heading,
		page.page,
		page.total_pages.max(1),
		page.total_items
	);

	if page.items.is_empty() {
		out.push_str("  no orders\n");
	}
	for order in &page.items {
		let _ = writeln!(out, "  {}", order_line(order));
	}
	out
}

pub fn board(board: &Board) -> String {
	let mut out = String::new();
	for lane in &board.lanes {
		let _ = writeln!(out, "== {} ({}) ==", lane.column.label, lane.orders.len());
		for order in &lane.orders {
			let _ = writeln!(out, "  {}", order_line(order));
		}
	}
	out
}

pub fn verdict(order: &OrderFlags, to: RequestedColumn, verdict: &TransitionVerdict) -> String {
	let from = infer_state(order);
	match verdict {
		TransitionVerdict::Allowed {
			operation,
			set_delivery_type: Some(delivery_type),
		} => format!(
			"allowed: {} -> {} via {} (delivery type set to {} first)",
			from, to, operation, delivery_type
		),
		TransitionVerdict::Allowed { operation, .. } => {
			format!("allowed: {} -> {} via {}", from, to, operation)
		},
		TransitionVerdict::MissingSignature { operation } => format!(
			"needs signature: {} -> {} via {} requires a customer signature",
			from, to, operation
		),
		TransitionVerdict::Denied(reason) => format!("denied: {} -> {}: {}", from, to, reason),
	}
}

pub fn change(change: &StatusChange) -> String {
	match change {
		StatusChange::Appeared { order_id, state } => {
			format!("new order #{}: {}", order_id, state.label())
		},
		StatusChange::Changed { order_id, from, to } => {
			format!("order #{}: {} -> {}", order_id, from.label(), to.label())
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_core::{paginate, DenialReason};
	use fulfillment_types::{
		default_board_columns, BackendOperation, DriverStatusCode, Flag, LifecycleState,
	};

	#[test]
	fn test_order_line() {
		let mut order = OrderFlags::new("12")
			.with_name("Ada Lovelace")
			.with_delivery_type(DeliveryType::Driver)
			.with_flag(Flag::GoToPickup, "Y");
		order.driver_order_status = Some(DriverStatusCode::GoingToPickup);

		let line = order_line(&order);
		assert!(line.starts_with("#12 "));
		assert!(line.contains(LifecycleState::DriverEnRouteToStore.label()));
		assert!(line.contains("Ada Lovelace"));
		assert!(line.ends_with("[driver: Going to Pickup]"));
	}

	#[test]
	fn test_list_output() {
		let orders = vec![OrderFlags::new("1"), OrderFlags::new("2").with_flag(Flag::Packed, "Y")];
		let counts = BucketCounts::tally(&orders);
		let out = list(&paginate(&orders, 1, 10), &counts, BucketFilter::All);

		assert!(out.starts_with("All 2 | Pending 1 | Accepted 0 | Packed 1"));
		assert!(out.contains("All orders (page 1 of 1, 2 total)"));

		let empty = list(&paginate::<OrderFlags>(&[], 1, 10), &counts, RequestedColumn::Delivered.into());
		assert!(empty.contains("Delivered orders (page 1 of 1, 0 total)"));
		assert!(empty.contains("no orders"));
	}

	#[test]
	fn test_board_output() {
		let orders = vec![OrderFlags::new("1")];
		let grouped = Board::group(&orders, &default_board_columns(), &Default::default());
		let out = board(&grouped);
		assert!(out.starts_with("== Pending (1) ==\n  #1"));
		assert!(!out.contains("Cancelled"));
	}

	#[test]
	fn test_verdict_output() {
		let order = OrderFlags::new("1");
		let accept = TransitionVerdict::Allowed {
			operation: BackendOperation::OrderAccept,
			set_delivery_type: Some(DeliveryType::SelfDelivery),
		};
		assert_eq!(
			verdict(&order, RequestedColumn::Accepted, &accept),
			"allowed: Pending -> accepted via OrderAccept (delivery type set to self first)"
		);

		let denied = TransitionVerdict::Denied(DenialReason::NotNextStep);
		assert_eq!(
			verdict(&order, RequestedColumn::Delivered, &denied),
			"denied: Pending -> delivered: target is not the next step"
		);
	}

	#[test]
	fn test_change_output() {
		let changed = StatusChange::Changed {
			order_id: "5".into(),
			from: LifecycleState::Packed,
			to: LifecycleState::InTransit,
		};
		assert_eq!(change(&changed), "order #5: Packed -> In Transit");
	}
}
