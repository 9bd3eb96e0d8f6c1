//! Detects lifecycle changes between successive polls of the order list.

use fulfillment_types::{LifecycleState, OrderFlags, OrderId};
use std::collections::HashMap;

use crate::inference::infer_state;

/// A difference between two polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
	/// An order not present in the previous poll.
	Appeared { order_id: OrderId, state: LifecycleState },
	/// An order whose derived state moved.
	Changed {
		order_id: OrderId,
		from: LifecycleState,
		to: LifecycleState,
	},
}

impl StatusChange {
	pub fn order_id(&self) -> &OrderId {
		match self {
			StatusChange::Appeared { order_id, .. } | StatusChange::Changed { order_id, .. } => order_id,
		}
	}
}

/// Remembers the last derived state of every order seen.
///
/// The first observation only seeds the tracker. Orders missing from a poll
/// are forgotten and reported as [`StatusChange::Appeared`] if they return.
#[derive(Debug, Default)]
pub struct StatusTracker {
	states: HashMap<OrderId, LifecycleState>,
	seeded: bool,
}

impl StatusTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `orders` and returns what changed since the previous call,
	/// in input order.
	pub fn observe(&mut self, orders: &[OrderFlags]) -> Vec<StatusChange> {
		let mut next = HashMap::with_capacity(orders.len());
		let mut changes = Vec::new();

		for order in orders {
			let state = infer_state(order);
			match self.states.get(&order.order_id) {
				Some(previous) if *previous != state => changes.push(StatusChange::Changed {
					order_id: order.order_id.clone(),
					from: *previous,
					to: state,
				}),
				Some(_) => {},
				None => changes.push(StatusChange::Appeared {
					order_id: order.order_id.clone(),
					state,
				}),
			}
			next.insert(order.order_id.clone(), state);
		}

		self.states = next;
		if !self.seeded {
			self.seeded = true;
			return Vec::new();
		}
		changes
	}

	pub fn state_of(&self, order_id: &OrderId) -> Option<LifecycleState> {
		self.states.get(order_id).copied()
	}

	pub fn reset(&mut self) {
		self.states.clear();
		self.seeded = false;
	}
}
