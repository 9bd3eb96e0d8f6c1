//! Transition validation.
//!
//! Self-delivery orders move one column at a time along
//! `pending → accepted → packed → in_transit → delivered`, and any order that
//! is not finished may be cancelled. Driver orders are advanced only by the
//! driver app, so the only manual move allowed on them is cancellation.

use fulfillment_types::{
	BackendOperation, DeliveryEvidence, DeliveryType, LifecycleState, RequestedColumn,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
	/// The order is already delivered or cancelled.
	Terminal,
	/// Driver orders only accept cancellation from this side.
	DriverManaged,
	/// The target is not the next column (skip, backward move or no-op).
	NotNextStep,
}

impl fmt::Display for DenialReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DenialReason::Terminal => write!(f, "order is already finished"),
			DenialReason::DriverManaged => write!(f, "driver orders are advanced by the driver app"),
			DenialReason::NotNextStep => write!(f, "target is not the next step"),
		}
	}
}

/// Outcome of checking one requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionVerdict {
	/// Legal. `set_delivery_type` is the delivery type to record on the order
	/// before sending `operation`, when it has none yet.
	Allowed {
		operation: BackendOperation,
		set_delivery_type: Option<DeliveryType>,
	},
	/// Legal move, but delivering needs a customer signature first.
	MissingSignature { operation: BackendOperation },
	Denied(DenialReason),
}

impl TransitionVerdict {
	pub fn is_allowed(&self) -> bool {
		matches!(self, TransitionVerdict::Allowed { .. })
	}

	/// Backend operation the move maps to, if the move is structurally legal.
	pub fn operation(&self) -> Option<BackendOperation> {
		match self {
			TransitionVerdict::Allowed { operation, .. }
			| TransitionVerdict::MissingSignature { operation } => Some(*operation),
			TransitionVerdict::Denied(_) => None,
		}
	}

	/// Turns the verdict into a result for code that wants to use `?`.
	pub fn into_result(
		self,
		from: LifecycleState,
		to: RequestedColumn,
	) -> Result<PlannedTransition, TransitionError> {
		match self {
			TransitionVerdict::Allowed {
				operation,
				set_delivery_type,
			} => Ok(PlannedTransition {
				operation,
				set_delivery_type,
			}),
			TransitionVerdict::MissingSignature { .. } => Err(TransitionError::MissingSignature),
			TransitionVerdict::Denied(reason) => Err(TransitionError::Denied { from, to, reason }),
		}
	}
}

/// A legal transition, ready to be sent to the Order Service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedTransition {
	pub operation: BackendOperation,
	pub set_delivery_type: Option<DeliveryType>,
}

/// Errors produced when a verdict is converted into a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
	#[error("Cannot move order from {from} to {to}: {reason}")]
	Denied {
		from: LifecycleState,
		to: RequestedColumn,
		reason: DenialReason,
	},
	#[error("Customer signature is required to mark the order delivered")]
	MissingSignature,
}

/// Forward moves for self-delivery orders: each column maps to the only
/// column it may move to and the operation that performs the move.
static FORWARD_CHAIN: Lazy<HashMap<RequestedColumn, (RequestedColumn, BackendOperation)>> =
	Lazy::new(|| {
		HashMap::from([
			(
				RequestedColumn::Pending,
				(RequestedColumn::Accepted, BackendOperation::OrderAccept),
			),
			(
				RequestedColumn::Accepted,
				(RequestedColumn::Packed, BackendOperation::OrderPacked),
			),
			(
				RequestedColumn::Packed,
				(RequestedColumn::InTransit, BackendOperation::OrderShipped),
			),
			(
				RequestedColumn::InTransit,
				(RequestedColumn::Delivered, BackendOperation::OrderDelivered),
			),
		])
	});

/// Decides whether manual status changes are legal.
pub struct TransitionValidator;

impl TransitionValidator {
	/// Checks moving an order in state `from` to column `to`.
	///
	/// `evidence` is only consulted when delivering.
	pub fn check(
		from: LifecycleState,
		delivery_type: DeliveryType,
		to: RequestedColumn,
		evidence: Option<&DeliveryEvidence>,
	) -> TransitionVerdict {
		if from.is_terminal() {
			return TransitionVerdict::Denied(DenialReason::Terminal);
		}

		if to == RequestedColumn::Cancelled {
			return TransitionVerdict::Allowed {
				operation: BackendOperation::CancelOrder,
				set_delivery_type: None,
			};
		}

		if delivery_type == DeliveryType::Driver {
			return TransitionVerdict::Denied(DenialReason::DriverManaged);
		}

		let operation = match FORWARD_CHAIN.get(&from.bucket()) {
			Some((next, operation)) if *next == to => *operation,
			_ => return TransitionVerdict::Denied(DenialReason::NotNextStep),
		};

		if operation == BackendOperation::OrderDelivered
			&& !evidence.is_some_and(DeliveryEvidence::has_signature)
		{
			return TransitionVerdict::MissingSignature { operation };
		}

		let set_delivery_type = (operation == BackendOperation::OrderAccept
			&& delivery_type == DeliveryType::Unset)
			.then_some(DeliveryType::SelfDelivery);

		TransitionVerdict::Allowed {
			operation,
			set_delivery_type,
		}
	}

	/// Like [`TransitionValidator::check`], as a result.
	pub fn require(
		from: LifecycleState,
		delivery_type: DeliveryType,
		to: RequestedColumn,
		evidence: Option<&DeliveryEvidence>,
	) -> Result<PlannedTransition, TransitionError> {
		Self::check(from, delivery_type, to, evidence).into_result(from, to)
	}

	/// Columns an order may be moved to, ignoring evidence requirements.
	pub fn targets(from: LifecycleState, delivery_type: DeliveryType) -> Vec<RequestedColumn> {
		RequestedColumn::ALL
			.into_iter()
			.filter(|to| Self::check(from, delivery_type, *to, None).operation().is_some())
			.collect()
	}
}

/// Checks a transition without delivery evidence.
pub fn can_transition(
	from: LifecycleState,
	delivery_type: DeliveryType,
	to: RequestedColumn,
) -> TransitionVerdict {
	TransitionValidator::check(from, delivery_type, to, None)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn signed() -> DeliveryEvidence {
		DeliveryEvidence::with_signature(b"png-bytes".to_vec())
	}

	#[test]
	fn test_self_chain_one_step_forward() {
		let cases = [
			(LifecycleState::Pending, RequestedColumn::Accepted, BackendOperation::OrderAccept),
			(LifecycleState::Accepted, RequestedColumn::Packed, BackendOperation::OrderPacked),
			(LifecycleState::Packed, RequestedColumn::InTransit, BackendOperation::OrderShipped),
		];
		for (from, to, expected) in cases {
			assert_eq!(
				can_transition(from, DeliveryType::SelfDelivery, to),
				TransitionVerdict::Allowed {
					operation: expected,
					set_delivery_type: None
				}
			);
		}
	}

	#[test]
	fn test_skipping_is_denied() {
		let verdict = can_transition(
			LifecycleState::Packed,
			DeliveryType::SelfDelivery,
			RequestedColumn::Delivered,
		);
		assert_eq!(verdict, TransitionVerdict::Denied(DenialReason::NotNextStep));
		assert!(!verdict.is_allowed());
	}

	#[test]
	fn test_backward_and_same_column_denied() {
		for to in [RequestedColumn::Pending, RequestedColumn::Accepted, RequestedColumn::Packed] {
			assert_eq!(
				can_transition(LifecycleState::Packed, DeliveryType::SelfDelivery, to),
				TransitionVerdict::Denied(DenialReason::NotNextStep)
			);
		}
	}

	#[test]
	fn test_driver_orders_only_cancel() {
		for to in RequestedColumn::ALL {
			let verdict = can_transition(LifecycleState::Pending, DeliveryType::Driver, to);
			if to == RequestedColumn::Cancelled {
				assert_eq!(verdict.operation(), Some(BackendOperation::CancelOrder));
			} else {
				assert_eq!(verdict, TransitionVerdict::Denied(DenialReason::DriverManaged));
			}
		}

		assert!(can_transition(
			LifecycleState::OutForDelivery,
			DeliveryType::Driver,
			RequestedColumn::Cancelled
		)
		.is_allowed());
	}

	#[test]
	fn test_terminal_states_have_no_moves() {
		for from in [LifecycleState::Delivered, LifecycleState::Cancelled] {
			for delivery_type in [DeliveryType::SelfDelivery, DeliveryType::Driver] {
				assert!(TransitionValidator::targets(from, delivery_type).is_empty());
				assert_eq!(
					can_transition(from, delivery_type, RequestedColumn::Cancelled),
					TransitionVerdict::Denied(DenialReason::Terminal)
				);
			}
		}
	}

	#[test]
	fn test_cancel_from_any_open_state() {
		for from in LifecycleState::ALL.into_iter().filter(|s| !s.is_terminal()) {
			assert_eq!(
				can_transition(from, DeliveryType::SelfDelivery, RequestedColumn::Cancelled),
				TransitionVerdict::Allowed {
					operation: BackendOperation::CancelOrder,
					set_delivery_type: None
				}
			);
		}
	}

	#[test]
	fn test_delivery_requires_signature() {
		let verdict = can_transition(
			LifecycleState::InTransit,
			DeliveryType::SelfDelivery,
			RequestedColumn::Delivered,
		);
		assert_eq!(
			verdict,
			TransitionVerdict::MissingSignature {
				operation: BackendOperation::OrderDelivered
			}
		);
		assert!(!verdict.is_allowed());

		let empty = DeliveryEvidence::default();
		assert!(matches!(
			TransitionValidator::check(
				LifecycleState::InTransit,
				DeliveryType::SelfDelivery,
				RequestedColumn::Delivered,
				Some(&empty)
			),
			TransitionVerdict::MissingSignature { .. }
		));

		assert!(TransitionValidator::check(
			LifecycleState::InTransit,
			DeliveryType::SelfDelivery,
			RequestedColumn::Delivered,
			Some(&signed())
		)
		.is_allowed());
	}

	#[test]
	fn test_unset_delivery_type_is_set_on_accept() {
		assert_eq!(
			can_transition(LifecycleState::Pending, DeliveryType::Unset, RequestedColumn::Accepted),
			TransitionVerdict::Allowed {
				operation: BackendOperation::OrderAccept,
				set_delivery_type: Some(DeliveryType::SelfDelivery)
			}
		);
		assert_eq!(
			can_transition(LifecycleState::Accepted, DeliveryType::Unset, RequestedColumn::Packed),
			TransitionVerdict::Allowed {
				operation: BackendOperation::OrderPacked,
				set_delivery_type: None
			}
		);
	}

	#[test]
	fn test_require_reports_errors() {
		let err = TransitionValidator::require(
			LifecycleState::Pending,
			DeliveryType::SelfDelivery,
			RequestedColumn::InTransit,
			None,
		)
		.unwrap_err();
		assert_eq!(
			err,
			TransitionError::Denied {
				from: LifecycleState::Pending,
				to: RequestedColumn::InTransit,
				reason: DenialReason::NotNextStep
			}
		);
		assert!(err.to_string().contains("in_transit"));

		assert_eq!(
			TransitionValidator::require(
				LifecycleState::InTransit,
				DeliveryType::SelfDelivery,
				RequestedColumn::Delivered,
				None
			),
			Err(TransitionError::MissingSignature)
		);
	}

	#[test]
	fn test_targets() {
		assert_eq!(
			TransitionValidator::targets(LifecycleState::InTransit, DeliveryType::SelfDelivery),
			vec![RequestedColumn::Delivered, RequestedColumn::Cancelled]
		);
		assert_eq!(
			TransitionValidator::targets(LifecycleState::DriverAssigned, DeliveryType::Driver),
			vec![RequestedColumn::Cancelled]
		);
	}
}
