//! Raw order records as returned by the Order Service.
//!
//! The backend encodes order progress as a sparse set of independent fields
//! (`accepted`, `packed`, `Shipped`, ...), each of which may arrive as a
//! `"Y"`/`"N"` string, a `1`/`0` number, a boolean, or not at all. Decoding
//! here never fails because of a flag's shape; interpretation is left to
//! [`is_truthy`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::driver::{self, DriverStatusCode};

/// Tokens that count as a set flag, compared trimmed and case-insensitively.
const TRUTHY_TOKENS: [&str; 4] = ["1", "y", "yes", "true"];

/// A single flag value in whatever shape the backend sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
	Bool(bool),
	Number(serde_json::Number),
	Text(String),
	/// Arrays, objects and anything else. Always falsy.
	Other(Value),
}

impl FlagValue {
	/// Applies the shared truthiness rule to this value.
	pub fn is_truthy(&self) -> bool {
		match self {
			FlagValue::Bool(b) => *b,
			FlagValue::Number(n) => is_truthy_token(&n.to_string()),
			FlagValue::Text(s) => is_truthy_token(s),
			FlagValue::Other(_) => false,
		}
	}

	/// Returns true when the value carries something, the way an id field is
	/// checked for presence: not blank, not zero, not `false`, not null.
	pub fn is_present(&self) -> bool {
		match self {
			FlagValue::Bool(b) => *b,
			FlagValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
			FlagValue::Text(s) => !s.trim().is_empty(),
			FlagValue::Other(v) => !v.is_null(),
		}
	}
}

impl From<bool> for FlagValue {
	fn from(value: bool) -> Self {
		FlagValue::Bool(value)
	}
}

impl From<i64> for FlagValue {
	fn from(value: i64) -> Self {
		FlagValue::Number(value.into())
	}
}

impl From<&str> for FlagValue {
	fn from(value: &str) -> Self {
		FlagValue::Text(value.to_string())
	}
}

fn is_truthy_token(raw: &str) -> bool {
	let token = raw.trim().to_ascii_lowercase();
	TRUTHY_TOKENS.contains(&token.as_str())
}

/// Shared truthiness rule used everywhere a flag is read.
///
/// Absent values are falsy.
pub fn is_truthy(value: Option<&FlagValue>) -> bool {
	value.is_some_and(FlagValue::is_truthy)
}

/// The progress flags carried by an order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
	Accepted,
	Packed,
	Shipped,
	Delivered,
	Cancelled,
	DriverDelivered,
	DriverAccepted,
	GoToPickup,
	ConfirmPickup,
	OnTheWayToTheCustomer,
	ReachedAtCustomer,
}

impl Flag {
	/// Field name used by the backend.
	pub fn wire_name(&self) -> &'static str {
		match self {
			Flag::Accepted => "accepted",
			Flag::Packed => "packed",
			Flag::Shipped => "Shipped",
			Flag::Delivered => "delivered",
			Flag::Cancelled => "cancelled",
			Flag::DriverDelivered => "driver_delivered",
			Flag::DriverAccepted => "driver_accepted",
			Flag::GoToPickup => "go_to_pickup",
			Flag::ConfirmPickup => "confirm_pickup",
			Flag::OnTheWayToTheCustomer => "on_the_way_to_the_customer",
			Flag::ReachedAtCustomer => "reached_at_customer",
		}
	}
}

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DeliveryType {
	/// No delivery type chosen yet. Treated like self-delivery.
	#[default]
	Unset,
	/// The seller delivers the order.
	SelfDelivery,
	/// A marketplace driver picks up and delivers the order.
	Driver,
}

impl DeliveryType {
	/// Wire token, `None` for [`DeliveryType::Unset`].
	pub fn as_str(&self) -> Option<&'static str> {
		match self {
			DeliveryType::Unset => None,
			DeliveryType::SelfDelivery => Some("self"),
			DeliveryType::Driver => Some("driver"),
		}
	}

	/// Lenient parse: anything other than `self` or `driver` is unset.
	pub fn parse_lenient(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"self" => DeliveryType::SelfDelivery,
			"driver" => DeliveryType::Driver,
			_ => DeliveryType::Unset,
		}
	}
}

impl fmt::Display for DeliveryType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str().unwrap_or("unset"))
	}
}

impl Serialize for DeliveryType {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self.as_str() {
			Some(token) => serializer.serialize_str(token),
			None => serializer.serialize_none(),
		}
	}
}

impl<'de> Deserialize<'de> for DeliveryType {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = Option::<Value>::deserialize(deserializer)?;
		Ok(value
			.as_ref()
			.and_then(Value::as_str)
			.map(DeliveryType::parse_lenient)
			.unwrap_or_default())
	}
}

/// Order identifier, normalized to its string form.
///
/// The backend sends ids as numbers on some endpoints and strings on others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(String);

impl OrderId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for OrderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for OrderId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl FromStr for OrderId {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::new(s.trim()))
	}
}

impl From<u64> for OrderId {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

impl Serialize for OrderId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for OrderId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Ok(OrderId(text_of(Value::deserialize(deserializer)?).unwrap_or_default()))
	}
}

/// Renders strings and numbers as text; null and structured values yield `None`.
fn text_of(value: Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

fn deserialize_lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Value>::deserialize(deserializer)?.and_then(text_of))
}

/// An order record as returned by the Order Service.
///
/// Only the fields the status engine reads are typed; everything else the
/// backend sends is kept in [`OrderFlags::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFlags {
	#[serde(default)]
	pub order_id: OrderId,
	/// Customer display name.
	#[serde(
		default,
		deserialize_with = "deserialize_lenient_text",
		skip_serializing_if = "Option::is_none"
	)]
	pub name: Option<String>,
	#[serde(
		default,
		deserialize_with = "deserialize_lenient_text",
		skip_serializing_if = "Option::is_none"
	)]
	pub phone: Option<String>,
	#[serde(
		default,
		deserialize_with = "deserialize_lenient_text",
		skip_serializing_if = "Option::is_none"
	)]
	pub order_date: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub accepted: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub packed: Option<FlagValue>,
	#[serde(rename = "Shipped", default, skip_serializing_if = "Option::is_none")]
	pub shipped: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delivered: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cancelled: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub driver_delivered: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub driver_accepted: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub go_to_pickup: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub confirm_pickup: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub on_the_way_to_the_customer: Option<FlagValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reached_at_customer: Option<FlagValue>,
	#[serde(default)]
	pub delivery_type: DeliveryType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub driver_id: Option<FlagValue>,
	#[serde(
		default,
		deserialize_with = "driver::deserialize_status_code",
		skip_serializing_if = "Option::is_none"
	)]
	pub driver_order_status: Option<DriverStatusCode>,
	/// Every other field of the backend record, untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl OrderFlags {
	/// Creates an empty record with the given id.
	pub fn new(order_id: impl Into<OrderId>) -> Self {
		Self {
			order_id: order_id.into(),
			..Default::default()
		}
	}

	fn slot(&self, flag: Flag) -> &Option<FlagValue> {
		match flag {
			Flag::Accepted => &self.accepted,
			Flag::Packed => &self.packed,
			Flag::Shipped => &self.shipped,
			Flag::Delivered => &self.delivered,
			Flag::Cancelled => &self.cancelled,
			Flag::DriverDelivered => &self.driver_delivered,
			Flag::DriverAccepted => &self.driver_accepted,
			Flag::GoToPickup => &self.go_to_pickup,
			Flag::ConfirmPickup => &self.confirm_pickup,
			Flag::OnTheWayToTheCustomer => &self.on_the_way_to_the_customer,
			Flag::ReachedAtCustomer => &self.reached_at_customer,
		}
	}

	fn slot_mut(&mut self, flag: Flag) -> &mut Option<FlagValue> {
		match flag {
			Flag::Accepted => &mut self.accepted,
			Flag::Packed => &mut self.packed,
			Flag::Shipped => &mut self.shipped,
			Flag::Delivered => &mut self.delivered,
			Flag::Cancelled => &mut self.cancelled,
			Flag::DriverDelivered => &mut self.driver_delivered,
			Flag::DriverAccepted => &mut self.driver_accepted,
			Flag::GoToPickup => &mut self.go_to_pickup,
			Flag::ConfirmPickup => &mut self.confirm_pickup,
			Flag::OnTheWayToTheCustomer => &mut self.on_the_way_to_the_customer,
			Flag::ReachedAtCustomer => &mut self.reached_at_customer,
		}
	}

	/// Reads a flag through the shared truthiness rule.
	pub fn is_set(&self, flag: Flag) -> bool {
		is_truthy(self.slot(flag).as_ref())
	}

	/// Overwrites a flag with the given value.
	pub fn set_flag(&mut self, flag: Flag, value: impl Into<FlagValue>) {
		*self.slot_mut(flag) = Some(value.into());
	}

	/// Builder form of [`OrderFlags::set_flag`].
	pub fn with_flag(mut self, flag: Flag, value: impl Into<FlagValue>) -> Self {
		self.set_flag(flag, value);
		self
	}

	pub fn with_delivery_type(mut self, delivery_type: DeliveryType) -> Self {
		self.delivery_type = delivery_type;
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// True when a driver id is attached to the order.
	pub fn has_driver(&self) -> bool {
		self.driver_id.as_ref().is_some_and(FlagValue::is_present)
	}
}
