//! Driver-app status codes.
//!
//! Driver orders carry a numeric `driver_order_status` maintained by the
//! driver app. The status engine never derives lifecycle states from it (the
//! boolean flags are authoritative), but the codes are surfaced for display
//! and for the next action a driver is expected to take.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Status code reported by the driver app for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DriverStatusCode {
	Available,
	Accepted,
	GoingToPickup,
	PickupConfirmed,
	ReachedStore,
	OnTheWay,
	ReachedCustomer,
	Delivered,
	ShipperConfirmedPickup,
}

/// The next step a driver can take from a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverAction {
	pub label: &'static str,
	pub next: DriverStatusCode,
}

impl DriverStatusCode {
	pub fn from_code(code: u64) -> Option<Self> {
		Some(match code {
			0 => Self::Available,
			1 => Self::Accepted,
			2 => Self::GoingToPickup,
			3 => Self::PickupConfirmed,
			4 => Self::ReachedStore,
			5 => Self::OnTheWay,
			6 => Self::ReachedCustomer,
			7 => Self::Delivered,
			8 => Self::ShipperConfirmedPickup,
			_ => return None,
		})
	}

	pub fn code(&self) -> u8 {
		match self {
			Self::Available => 0,
			Self::Accepted => 1,
			Self::GoingToPickup => 2,
			Self::PickupConfirmed => 3,
			Self::ReachedStore => 4,
			Self::OnTheWay => 5,
			Self::ReachedCustomer => 6,
			Self::Delivered => 7,
			Self::ShipperConfirmedPickup => 8,
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Available => "Available",
			Self::Accepted => "Accepted",
			Self::GoingToPickup => "Going to Pickup",
			Self::PickupConfirmed => "Pickup Confirmed",
			Self::ReachedStore => "Reached Store",
			Self::OnTheWay => "On the Way",
			Self::ReachedCustomer => "Reached Customer",
			Self::Delivered => "Delivered",
			Self::ShipperConfirmedPickup => "Pickup Confirmed by Shipper",
		}
	}

	/// Next driver action. Drivers reach the store before confirming pickup,
	/// so code 2 advances to 4 and code 4 back to 3.
	pub fn next_action(&self) -> Option<DriverAction> {
		let (label, next) = match self {
			Self::Available => ("Accept", Self::Accepted),
			Self::Accepted => ("Go to pick up", Self::GoingToPickup),
			Self::GoingToPickup => ("Reached at store", Self::ReachedStore),
			Self::ReachedStore => ("Confirm pickup", Self::PickupConfirmed),
			Self::PickupConfirmed => ("On the way", Self::OnTheWay),
			Self::OnTheWay => ("Reached at customer", Self::ReachedCustomer),
			Self::ReachedCustomer => ("Delivered", Self::Delivered),
			Self::Delivered | Self::ShipperConfirmedPickup => return None,
		};
		Some(DriverAction { label, next })
	}

	/// Decodes the backend's representation: a bare number, a numeric string,
	/// or an object carrying `driver_order_status` or `status`.
	pub fn from_json(value: &Value) -> Option<Self> {
		match value {
			Value::Number(n) => n.as_u64().and_then(Self::from_code),
			Value::String(s) => s.trim().parse().ok().and_then(Self::from_code),
			Value::Object(map) => map
				.get("driver_order_status")
				.or_else(|| map.get("status"))
				.and_then(Self::from_json),
			_ => None,
		}
	}
}

impl fmt::Display for DriverStatusCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl Serialize for DriverStatusCode {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u8(self.code())
	}
}

/// Field deserializer for `driver_order_status`: unknown values become `None`.
pub(crate) fn deserialize_status_code<'de, D>(
	deserializer: D,
) -> Result<Option<DriverStatusCode>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(value.as_ref().and_then(DriverStatusCode::from_json))
}
