//! Order lifecycle types.
//!
//! This module defines the derived lifecycle states, the coarse board columns
//! they fall into, and the backend operations that move an order forward.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::DeliveryType;

/// Canonical lifecycle state of an order, derived from its flags.
///
/// States are recomputed from the latest record on every read and never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
	/// Self-delivery order waiting for the seller.
	Pending,
	/// Accepted by the seller.
	Accepted,
	/// Packed and ready to leave.
	Packed,
	/// Shipped by the seller.
	InTransit,
	/// Driver order with no driver yet.
	SearchingForDriver,
	/// A driver accepted the order.
	DriverAssigned,
	/// Packed, waiting for the driver to come.
	PackedWaitingForDriver,
	/// Driver is heading to the store.
	DriverEnRouteToStore,
	/// Driver confirmed pickup.
	DriverPickedUp,
	/// Driver is heading to the customer.
	OutForDelivery,
	/// Driver arrived at the customer.
	ReachedCustomer,
	/// Delivered. Terminal.
	Delivered,
	/// Cancelled. Terminal.
	Cancelled,
}

impl LifecycleState {
	/// Every state, in lifecycle order.
	pub const ALL: [LifecycleState; 13] = [
		LifecycleState::Pending,
		LifecycleState::Accepted,
		LifecycleState::Packed,
		LifecycleState::InTransit,
		LifecycleState::SearchingForDriver,
		LifecycleState::DriverAssigned,
		LifecycleState::PackedWaitingForDriver,
		LifecycleState::DriverEnRouteToStore,
		LifecycleState::DriverPickedUp,
		LifecycleState::OutForDelivery,
		LifecycleState::ReachedCustomer,
		LifecycleState::Delivered,
		LifecycleState::Cancelled,
	];

	/// State of a freshly created order.
	pub fn initial(delivery_type: DeliveryType) -> Self {
		match delivery_type {
			DeliveryType::Driver => LifecycleState::SearchingForDriver,
			DeliveryType::SelfDelivery | DeliveryType::Unset => LifecycleState::Pending,
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, LifecycleState::Delivered | LifecycleState::Cancelled)
	}

	/// Board column this state is shown in. Driver sub-states fall into the
	/// column of their nearest self-delivery analogue.
	pub fn bucket(&self) -> RequestedColumn {
		match self {
			LifecycleState::Pending | LifecycleState::SearchingForDriver => RequestedColumn::Pending,
			LifecycleState::Accepted | LifecycleState::DriverAssigned => RequestedColumn::Accepted,
			LifecycleState::Packed | LifecycleState::PackedWaitingForDriver => {
				RequestedColumn::Packed
			},
			LifecycleState::InTransit
			| LifecycleState::DriverEnRouteToStore
			| LifecycleState::DriverPickedUp
			| LifecycleState::OutForDelivery
			| LifecycleState::ReachedCustomer => RequestedColumn::InTransit,
			LifecycleState::Delivered => RequestedColumn::Delivered,
			LifecycleState::Cancelled => RequestedColumn::Cancelled,
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			LifecycleState::Pending => "Pending",
			LifecycleState::Accepted => "Accepted",
			LifecycleState::Packed => "Packed",
			LifecycleState::InTransit => "In Transit",
			LifecycleState::SearchingForDriver => "Searching for Driver",
			LifecycleState::DriverAssigned => "Driver Assigned",
			LifecycleState::PackedWaitingForDriver => "Waiting for Driver",
			LifecycleState::DriverEnRouteToStore => "Driver Going to Store",
			LifecycleState::DriverPickedUp => "Driver Picked Up",
			LifecycleState::OutForDelivery => "Driver En Route",
			LifecycleState::ReachedCustomer => "Driver at Customer",
			LifecycleState::Delivered => "Delivered",
			LifecycleState::Cancelled => "Cancelled",
		}
	}
}

impl fmt::Display for LifecycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Coarse, UI-facing column an order is grouped into and dragged between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedColumn {
	Pending,
	Accepted,
	Packed,
	#[serde(alias = "shipped")]
	InTransit,
	Delivered,
	#[serde(alias = "canceled")]
	Cancelled,
}

impl RequestedColumn {
	pub const ALL: [RequestedColumn; 6] = [
		RequestedColumn::Pending,
		RequestedColumn::Accepted,
		RequestedColumn::Packed,
		RequestedColumn::InTransit,
		RequestedColumn::Delivered,
		RequestedColumn::Cancelled,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			RequestedColumn::Pending => "pending",
			RequestedColumn::Accepted => "accepted",
			RequestedColumn::Packed => "packed",
			RequestedColumn::InTransit => "in_transit",
			RequestedColumn::Delivered => "delivered",
			RequestedColumn::Cancelled => "cancelled",
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			RequestedColumn::Pending => "Pending",
			RequestedColumn::Accepted => "Accepted",
			RequestedColumn::Packed => "Packed",
			RequestedColumn::InTransit => "In Transit",
			RequestedColumn::Delivered => "Delivered",
			RequestedColumn::Cancelled => "Cancelled",
		}
	}
}

impl fmt::Display for RequestedColumn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a column or bucket name is not recognized.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown column '{0}'")]
pub struct ParseColumnError(pub String);

impl FromStr for RequestedColumn {
	type Err = ParseColumnError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
			"pending" => Ok(RequestedColumn::Pending),
			"accepted" => Ok(RequestedColumn::Accepted),
			"packed" => Ok(RequestedColumn::Packed),
			"in_transit" | "shipped" => Ok(RequestedColumn::InTransit),
			"delivered" => Ok(RequestedColumn::Delivered),
			"cancelled" | "canceled" => Ok(RequestedColumn::Cancelled),
			_ => Err(ParseColumnError(s.to_string())),
		}
	}
}

/// Bucket selector used when filtering order lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BucketFilter {
	#[default]
	All,
	Only(RequestedColumn),
}

impl BucketFilter {
	pub fn matches(&self, column: RequestedColumn) -> bool {
		match self {
			BucketFilter::All => true,
			BucketFilter::Only(wanted) => *wanted == column,
		}
	}
}

impl FromStr for BucketFilter {
	type Err = ParseColumnError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.trim().eq_ignore_ascii_case("all") {
			return Ok(BucketFilter::All);
		}
		s.parse().map(BucketFilter::Only)
	}
}

impl From<RequestedColumn> for BucketFilter {
	fn from(column: RequestedColumn) -> Self {
		BucketFilter::Only(column)
	}
}

/// Status-update token forwarded verbatim to the Order Service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendOperation {
	OrderAccept,
	OrderPacked,
	OrderShipped,
	OrderDelivered,
	CancelOrder,
}

impl BackendOperation {
	pub fn as_str(&self) -> &'static str {
		match self {
			BackendOperation::OrderAccept => "OrderAccept",
			BackendOperation::OrderPacked => "OrderPacked",
			BackendOperation::OrderShipped => "OrderShipped",
			BackendOperation::OrderDelivered => "OrderDelivered",
			BackendOperation::CancelOrder => "CancelOrder",
		}
	}

	/// True for operations that move an order forward along its chain.
	/// Cancellation goes through its own endpoint.
	pub fn is_forward(&self) -> bool {
		!matches!(self, BackendOperation::CancelOrder)
	}
}

impl fmt::Display for BackendOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One configurable column of the fulfillment board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
	pub id: RequestedColumn,
	pub label: String,
	#[serde(default = "default_visible")]
	pub visible: bool,
}

fn default_visible() -> bool {
	true
}

impl BoardColumn {
	pub fn new(id: RequestedColumn, visible: bool) -> Self {
		Self {
			id,
			label: id.label().to_string(),
			visible,
		}
	}
}

/// Default board layout: every column visible except cancelled.
pub fn default_board_columns() -> Vec<BoardColumn> {
	RequestedColumn::ALL
		.iter()
		.map(|id| BoardColumn::new(*id, *id != RequestedColumn::Cancelled))
		.collect()
}
