//! Payloads exchanged with the Order Service.

use serde::{Deserialize, Serialize};

use crate::{BackendOperation, OrderFlags, OrderId};

/// Response envelope used by every Order Service endpoint.
///
/// `status == 1` means success; anything else carries a `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
	#[serde(default)]
	pub status: i64,
	pub message: Option<String>,
	pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
	pub fn is_success(&self) -> bool {
		self.status == 1
	}
}

/// Payload of the order listing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipperOrders {
	#[serde(default)]
	pub orders: Vec<OrderFlags>,
}

/// Proof collected when a seller delivers an order themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryEvidence {
	/// Customer signature image. Required; empty counts as missing.
	pub customer_signature: Vec<u8>,
	/// Optional photo of the delivered package.
	pub delivery_proof: Option<Vec<u8>>,
	pub package_received_by: String,
	pub driver_note: String,
	pub visibly_intoxicated: bool,
}

impl DeliveryEvidence {
	pub fn with_signature(signature: Vec<u8>) -> Self {
		Self {
			customer_signature: signature,
			..Default::default()
		}
	}

	pub fn has_signature(&self) -> bool {
		!self.customer_signature.is_empty()
	}
}

/// A validated status change ready to be sent to the Order Service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
	pub order_id: OrderId,
	pub operation: BackendOperation,
	/// Present only for [`BackendOperation::OrderDelivered`].
	pub evidence: Option<DeliveryEvidence>,
}
