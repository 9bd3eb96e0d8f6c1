//! In-memory Order Service backend.
//!
//! Orders live in a list guarded by a read-write lock and can be seeded from a
//! JSON fixture. Status updates set the matching flag to `"Y"`, the way the
//! real backend records them. Useful for demos and tests.

use crate::{OrderServiceError, OrderServiceInterface};
use async_trait::async_trait;
use fulfillment_types::{
	BackendOperation, ConfigSchema, DeliveryType, Field, FieldType, Flag, OrderFlags, OrderId,
	Schema, ShipperOrders, StatusUpdate, ValidationError,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Order Service that keeps orders in memory.
///
/// All accounts share one order list. Clones share the same orders.
#[derive(Clone)]
pub struct MemoryOrderService {
	orders: Arc<RwLock<Vec<OrderFlags>>>,
}

impl MemoryOrderService {
	pub fn new(orders: Vec<OrderFlags>) -> Self {
		Self {
			orders: Arc::new(RwLock::new(orders)),
		}
	}

	/// Loads orders from a JSON file holding either a bare array or an
	/// `{"orders": [...]}` object.
	pub fn from_fixture(path: impl AsRef<Path>) -> Result<Self, OrderServiceError> {
		let path = path.as_ref();
		let raw = std::fs::read_to_string(path).map_err(|e| {
			OrderServiceError::Configuration(format!(
				"Cannot read fixture {}: {}",
				path.display(),
				e
			))
		})?;

		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Fixture {
			List(Vec<OrderFlags>),
			Wrapped(ShipperOrders),
		}

		let fixture: Fixture = serde_json::from_str(&raw)
			.map_err(|e| OrderServiceError::Decode(format!("{}: {}", path.display(), e)))?;
		let orders = match fixture {
			Fixture::List(orders) => orders,
			Fixture::Wrapped(wrapped) => wrapped.orders,
		};
		Ok(Self::new(orders))
	}

	async fn modify<F>(&self, order_id: &OrderId, apply: F) -> Result<(), OrderServiceError>
	where
		F: FnOnce(&mut OrderFlags),
	{
		let mut orders = self.orders.write().await;
		let order = orders
			.iter_mut()
			.find(|order| &order.order_id == order_id)
			.ok_or_else(|| OrderServiceError::NotFound(order_id.clone()))?;
		apply(order);
		Ok(())
	}
}

impl Default for MemoryOrderService {
	fn default() -> Self {
		Self::new(Vec::new())
	}
}

/// Flag the backend raises for each operation.
fn flag_for(operation: BackendOperation) -> Flag {
	match operation {
		BackendOperation::OrderAccept => Flag::Accepted,
		BackendOperation::OrderPacked => Flag::Packed,
		BackendOperation::OrderShipped => Flag::Shipped,
		BackendOperation::OrderDelivered => Flag::Delivered,
		BackendOperation::CancelOrder => Flag::Cancelled,
	}
}

#[async_trait]
impl OrderServiceInterface for MemoryOrderService {
	async fn fetch_orders(
		&self,
		_account: &str,
		order_id: Option<OrderId>,
	) -> Result<Vec<OrderFlags>, OrderServiceError> {
		let orders = self.orders.read().await;
		Ok(orders
			.iter()
			.filter(|order| order_id.as_ref().is_none_or(|id| &order.order_id == id))
			.cloned()
			.collect())
	}

	async fn update_status(
		&self,
		_account: &str,
		update: &StatusUpdate,
	) -> Result<(), OrderServiceError> {
		debug!(order_id = %update.order_id, operation = %update.operation, "Applying update in memory");
		self.modify(&update.order_id, |order| {
			order.set_flag(flag_for(update.operation), "Y");
			if let Some(evidence) = &update.evidence {
				order.extra.insert(
					"package_received_by".to_string(),
					evidence.package_received_by.clone().into(),
				);
				order.extra.insert(
					"driver_note".to_string(),
					evidence.driver_note.clone().into(),
				);
			}
		})
		.await
	}

	async fn cancel_order(&self, order_id: &OrderId) -> Result<(), OrderServiceError> {
		self.modify(order_id, |order| order.set_flag(Flag::Cancelled, "Y"))
			.await
	}

	async fn change_delivery_type(
		&self,
		order_id: &OrderId,
		delivery_type: DeliveryType,
	) -> Result<(), OrderServiceError> {
		self.modify(order_id, |order| order.delivery_type = delivery_type)
			.await
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryOrderServiceSchema)
	}
}

/// Configuration schema for [`MemoryOrderService`].
pub struct MemoryOrderServiceSchema;

impl ConfigSchema for MemoryOrderServiceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("fixture", FieldType::String)]);
		schema.validate(config)
	}
}

/// Factory function to create a memory backend from configuration.
///
/// Configuration parameters:
/// - `fixture` (optional): path to a JSON file with the initial orders
pub fn create_order_service(
	config: &toml::Value,
) -> Result<Box<dyn OrderServiceInterface>, OrderServiceError> {
	MemoryOrderServiceSchema
		.validate(config)
		.map_err(|e| OrderServiceError::Configuration(format!("Invalid configuration: {}", e)))?;

	let service = match config.get("fixture").and_then(|v| v.as_str()) {
		Some(path) => MemoryOrderService::from_fixture(path)?,
		None => MemoryOrderService::default(),
	};
	Ok(Box::new(service))
}

/// Registry for the memory backend.
pub struct Registry;

impl fulfillment_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::OrderServiceFactory;

	fn factory() -> Self::Factory {
		create_order_service
	}
}

impl crate::OrderServiceRegistry for Registry {}
