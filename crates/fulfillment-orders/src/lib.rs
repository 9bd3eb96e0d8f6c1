//! Order Service client layer.
//!
//! The Order Service is the backend that owns order records. This crate
//! defines the interface every backend implements, the registry of available
//! backends, and [`OrderService`], which checks every status change against
//! the lifecycle rules before it reaches the backend.

use async_trait::async_trait;
use fulfillment_core::{infer_state, PlannedTransition, TransitionError, TransitionValidator};
use fulfillment_types::{
	BackendOperation, ConfigSchema, DeliveryEvidence, DeliveryType, ImplementationRegistry,
	OrderFlags, OrderId, RequestedColumn, StatusUpdate,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod memory;
}

/// Errors that can occur while talking to the Order Service.
#[derive(Debug, Error)]
pub enum OrderServiceError {
	/// The request never got a usable response.
	#[error("Network error: {0}")]
	Network(String),
	/// The backend answered with a failure status or envelope.
	#[error("Rejected by order service: {0}")]
	Rejected(String),
	/// The response body could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// The requested status change is not legal for the order.
	#[error(transparent)]
	Transition(#[from] TransitionError),
	#[error("Order {0} not found")]
	NotFound(OrderId),
}

/// Operations every Order Service backend provides.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderServiceInterface: Send + Sync {
	/// Lists the orders of `account`, or only `order_id` when given.
	async fn fetch_orders(
		&self,
		account: &str,
		order_id: Option<OrderId>,
	) -> Result<Vec<OrderFlags>, OrderServiceError>;

	/// Applies a forward status change on behalf of `account`.
	async fn update_status(
		&self,
		account: &str,
		update: &StatusUpdate,
	) -> Result<(), OrderServiceError>;

	async fn cancel_order(&self, order_id: &OrderId) -> Result<(), OrderServiceError>;

	async fn change_delivery_type(
		&self,
		order_id: &OrderId,
		delivery_type: DeliveryType,
	) -> Result<(), OrderServiceError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for Order Service factory functions.
pub type OrderServiceFactory =
	fn(&toml::Value) -> Result<Box<dyn OrderServiceInterface>, OrderServiceError>;

/// Registry trait for Order Service implementations.
pub trait OrderServiceRegistry: ImplementationRegistry<Factory = OrderServiceFactory> {}

/// Get all registered Order Service implementations.
///
/// Returns a vector of (name, factory) tuples for all available backends.
pub fn get_all_implementations() -> Vec<(&'static str, OrderServiceFactory)> {
	use implementations::{http, memory};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Order Service bound to one seller account.
///
/// Status changes are validated locally first; an illegal request fails with
/// [`OrderServiceError::Transition`] without any backend call.
pub struct OrderService {
	backend: Box<dyn OrderServiceInterface>,
	account: String,
}

impl OrderService {
	pub fn new(backend: Box<dyn OrderServiceInterface>, account: impl Into<String>) -> Self {
		Self {
			backend,
			account: account.into(),
		}
	}

	pub fn account(&self) -> &str {
		&self.account
	}

	#[instrument(skip(self), fields(account = %self.account))]
	pub async fn fetch_orders(&self) -> Result<Vec<OrderFlags>, OrderServiceError> {
		let orders = self.backend.fetch_orders(&self.account, None).await?;
		info!(count = orders.len(), "Fetched orders");
		Ok(orders)
	}

	#[instrument(skip(self), fields(account = %self.account))]
	pub async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderFlags, OrderServiceError> {
		self.backend
			.fetch_orders(&self.account, Some(order_id.clone()))
			.await?
			.into_iter()
			.find(|order| &order.order_id == order_id)
			.ok_or_else(|| OrderServiceError::NotFound(order_id.clone()))
	}

	/// Moves `order` to `target`. Sets the delivery type first when the move
	/// requires it. Evidence is forwarded only for deliveries.
	#[instrument(skip(self, order, evidence), fields(order_id = %order.order_id, to = %target))]
	pub async fn advance(
		&self,
		order: &OrderFlags,
		target: RequestedColumn,
		evidence: Option<DeliveryEvidence>,
	) -> Result<PlannedTransition, OrderServiceError> {
		let from = infer_state(order);
		let plan = TransitionValidator::require(from, order.delivery_type, target, evidence.as_ref())
			.inspect_err(|e| warn!(%from, "Rejected status change: {}", e))?;

		if plan.operation == BackendOperation::CancelOrder {
			self.backend.cancel_order(&order.order_id).await?;
			info!(%from, "Order cancelled");
			return Ok(plan);
		}

		if let Some(delivery_type) = plan.set_delivery_type {
			self.backend
				.change_delivery_type(&order.order_id, delivery_type)
				.await?;
			info!(%delivery_type, "Delivery type set");
		}

		let update = StatusUpdate {
			order_id: order.order_id.clone(),
			operation: plan.operation,
			evidence: evidence.filter(|_| plan.operation == BackendOperation::OrderDelivered),
		};
		self.backend.update_status(&self.account, &update).await?;
		info!(%from, operation = %plan.operation, "Order status updated");

		Ok(plan)
	}

	pub async fn cancel(&self, order: &OrderFlags) -> Result<(), OrderServiceError> {
		self.advance(order, RequestedColumn::Cancelled, None)
			.await
			.map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_core::DenialReason;
	use fulfillment_types::{Flag, LifecycleState};

	fn service(mock: MockOrderServiceInterface) -> OrderService {
		OrderService::new(Box::new(mock), "42")
	}

	#[tokio::test]
	async fn test_fetch_order_not_found() {
		let mut mock = MockOrderServiceInterface::new();
		mock.expect_fetch_orders()
			.withf(|account, order_id| {
				account.to_string() == "42" && order_id.as_ref().map(OrderId::as_str) == Some("7")
			})
			.times(1)
			.returning(|_, _| Ok(vec![OrderFlags::new("8")]));

		let result = service(mock).fetch_order(&OrderId::from("7")).await;
		assert!(matches!(result, Err(OrderServiceError::NotFound(id)) if id.as_str() == "7"));
	}

	#[tokio::test]
	async fn test_advance_sends_next_operation() {
		let mut mock = MockOrderServiceInterface::new();
		mock.expect_change_delivery_type().never();
		mock.expect_update_status()
			.withf(|account, update| {
				account.to_string() == "42"
					&& update.order_id.as_str() == "5"
					&& update.operation == BackendOperation::OrderPacked
					&& update.evidence.is_none()
			})
			.times(1)
			.returning(|_, _| Ok(()));

		let order = OrderFlags::new("5")
			.with_delivery_type(DeliveryType::SelfDelivery)
			.with_flag(Flag::Accepted, "Y");
		let plan = service(mock)
			.advance(&order, RequestedColumn::Packed, None)
			.await
			.unwrap();
		assert_eq!(plan.operation, BackendOperation::OrderPacked);
	}

	#[tokio::test]
	async fn test_accept_sets_delivery_type_first() {
		let mut mock = MockOrderServiceInterface::new();
		let mut seq = mockall::Sequence::new();
		mock.expect_change_delivery_type()
			.withf(|id, delivery_type| {
				id.as_str() == "3" && *delivery_type == DeliveryType::SelfDelivery
			})
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(()));
		mock.expect_update_status()
			.withf(|_, update| update.operation == BackendOperation::OrderAccept)
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(()));

		let plan = service(mock)
			.advance(&OrderFlags::new("3"), RequestedColumn::Accepted, None)
			.await
			.unwrap();
		assert_eq!(plan.set_delivery_type, Some(DeliveryType::SelfDelivery));
	}

	#[tokio::test]
	async fn test_illegal_transition_never_reaches_backend() {
		let mut mock = MockOrderServiceInterface::new();
		mock.expect_update_status().never();
		mock.expect_change_delivery_type().never();
		mock.expect_cancel_order().never();
		let service = service(mock);

		let skip = service
			.advance(&OrderFlags::new("1"), RequestedColumn::Packed, None)
			.await;
		assert!(matches!(
			skip,
			Err(OrderServiceError::Transition(TransitionError::Denied {
				from: LifecycleState::Pending,
				reason: DenialReason::NotNextStep,
				..
			}))
		));

		let driver = OrderFlags::new("2").with_delivery_type(DeliveryType::Driver);
		let driver_move = service
			.advance(&driver, RequestedColumn::Accepted, None)
			.await;
		assert!(matches!(
			driver_move,
			Err(OrderServiceError::Transition(TransitionError::Denied {
				reason: DenialReason::DriverManaged,
				..
			}))
		));

		let delivered = OrderFlags::new("4").with_flag(Flag::Delivered, "Y");
		assert!(service.cancel(&delivered).await.is_err());
	}

	#[tokio::test]
	async fn test_delivery_requires_signature() {
		let mut mock = MockOrderServiceInterface::new();
		mock.expect_update_status()
			.withf(|_, update| {
				update.operation == BackendOperation::OrderDelivered
					&& update.evidence.as_ref().is_some_and(|e| e.package_received_by == "Neighbour")
			})
			.times(1)
			.returning(|_, _| Ok(()));
		let service = service(mock);
		let shipped = OrderFlags::new("6")
			.with_delivery_type(DeliveryType::SelfDelivery)
			.with_flag(Flag::Shipped, "Y");

		let unsigned = service
			.advance(&shipped, RequestedColumn::Delivered, None)
			.await;
		assert!(matches!(
			unsigned,
			Err(OrderServiceError::Transition(TransitionError::MissingSignature))
		));

		let evidence = DeliveryEvidence {
			package_received_by: "Neighbour".to_string(),
			..DeliveryEvidence::with_signature(vec![1, 2, 3])
		};
		service
			.advance(&shipped, RequestedColumn::Delivered, Some(evidence))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_cancel_driver_order() {
		let mut mock = MockOrderServiceInterface::new();
		mock.expect_update_status().never();
		mock.expect_cancel_order()
			.withf(|id| id.as_str() == "9")
			.times(1)
			.returning(|_| Ok(()));

		let order = OrderFlags::new("9")
			.with_delivery_type(DeliveryType::Driver)
			.with_flag(Flag::GoToPickup, "Y");
		service(mock).cancel(&order).await.unwrap();
	}

	#[tokio::test]
	async fn test_backend_errors_propagate() {
		let mut mock = MockOrderServiceInterface::new();
		mock.expect_fetch_orders()
			.returning(|_, _| Err(OrderServiceError::Rejected("Invalid account".into())));

		let err = service(mock).fetch_orders().await.unwrap_err();
		assert_eq!(err.to_string(), "Rejected by order service: Invalid account");
	}
}
