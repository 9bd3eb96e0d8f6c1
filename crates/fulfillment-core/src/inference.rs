//! Lifecycle state inference.
//!
//! The backend never sends a status field. Progress is spread over independent
//! flags, so the state is found by walking a fixed precedence list and taking
//! the first flag that is set. Terminal flags come first, so a cancelled order
//! stays cancelled whatever else is set on it.

use fulfillment_types::{DeliveryType, Flag, LifecycleState, OrderFlags, RequestedColumn};

/// Driver sub-states, most advanced first.
const DRIVER_PRECEDENCE: [(Flag, LifecycleState); 5] = [
	(Flag::ReachedAtCustomer, LifecycleState::ReachedCustomer),
	(Flag::OnTheWayToTheCustomer, LifecycleState::OutForDelivery),
	(Flag::ConfirmPickup, LifecycleState::DriverPickedUp),
	(Flag::GoToPickup, LifecycleState::DriverEnRouteToStore),
	(Flag::Packed, LifecycleState::PackedWaitingForDriver),
];

/// Self-delivery states, most advanced first.
const SELF_PRECEDENCE: [(Flag, LifecycleState); 3] = [
	(Flag::Shipped, LifecycleState::InTransit),
	(Flag::Packed, LifecycleState::Packed),
	(Flag::Accepted, LifecycleState::Accepted),
];

/// Derives the lifecycle state of an order. Total and deterministic.
pub fn infer_state(order: &OrderFlags) -> LifecycleState {
	if order.is_set(Flag::Cancelled) {
		return LifecycleState::Cancelled;
	}

	let is_driver = order.delivery_type == DeliveryType::Driver;
	if order.is_set(Flag::Delivered) || (is_driver && order.is_set(Flag::DriverDelivered)) {
		return LifecycleState::Delivered;
	}

	if is_driver {
		// Self-delivery flags (accepted, Shipped) are ignored on driver orders.
		return first_set(order, &DRIVER_PRECEDENCE).unwrap_or_else(|| {
			if order.is_set(Flag::DriverAccepted) || order.has_driver() {
				LifecycleState::DriverAssigned
			} else {
				LifecycleState::SearchingForDriver
			}
		});
	}

	first_set(order, &SELF_PRECEDENCE).unwrap_or(LifecycleState::Pending)
}

/// Board column of an order.
pub fn infer_bucket(order: &OrderFlags) -> RequestedColumn {
	infer_state(order).bucket()
}

fn first_set(order: &OrderFlags, precedence: &[(Flag, LifecycleState)]) -> Option<LifecycleState> {
	precedence
		.iter()
		.find(|(flag, _)| order.is_set(*flag))
		.map(|(_, state)| *state)
}
