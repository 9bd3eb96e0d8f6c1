//! Factory registry for Order Service backends.
//!
//! Backends register themselves by name; the configured `primary` picks one.

use fulfillment_config::Config;
use fulfillment_orders::{OrderService, OrderServiceFactory};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global registry for all Order Service factories
pub struct FactoryRegistry {
	pub order_service: HashMap<String, OrderServiceFactory>,
}

impl FactoryRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			order_service: HashMap::new(),
		}
	}

	pub fn register_order_service(&mut self, name: impl Into<String>, factory: OrderServiceFactory) {
		self.order_service.insert(name.into(), factory);
	}

	fn available(&self) -> String {
		let mut names: Vec<_> = self.order_service.keys().cloned().collect();
		names.sort();
		names.join(", ")
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Get the global factory registry, registering every backend on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();
		for (name, factory) in fulfillment_orders::get_all_implementations() {
			tracing::debug!("Registering order service implementation: {}", name);
			registry.register_order_service(name, factory);
		}
		registry
	})
}

/// Builds the [`OrderService`] for the configured primary backend.
pub fn build_order_service(config: &Config) -> Result<OrderService, Box<dyn std::error::Error>> {
	get_registry().build(config)
}

impl FactoryRegistry {
	/// Creates the primary backend and checks its table against the
	/// backend's own schema.
	pub fn build(&self, config: &Config) -> Result<OrderService, Box<dyn std::error::Error>> {
		let primary = &config.order_service.primary;

		let factory = self.order_service.get(primary).ok_or_else(|| {
			format!(
				"Unknown order service implementation '{}'. Available: [{}]",
				primary,
				self.available()
			)
		})?;
		let table = config
			.order_service
			.primary_config()
			.ok_or_else(|| format!("No configuration for order service '{}'", primary))?;

		let backend = factory(table)?;
		backend.config_schema().validate(table).map_err(|e| {
			tracing::error!(implementation = %primary, error = %e, "Invalid order service configuration");
			format!("Invalid configuration for order service '{}': {}", primary, e)
		})?;

		tracing::info!(implementation = %primary, "Order service ready");
		Ok(OrderService::new(backend, config.account.wh_account_id.clone()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_orders::{OrderServiceError, OrderServiceInterface};
	use fulfillment_types::{
		ConfigSchema, DeliveryType, Field, FieldType, OrderFlags, OrderId, Schema, StatusUpdate,
		ValidationError,
	};

	#[test]
	fn test_registry_contains_all_backends() {
		let registry = get_registry();
		assert!(registry.order_service.contains_key("http"));
		assert!(registry.order_service.contains_key("memory"));
		assert_eq!(registry.available(), "http, memory");
	}

	#[test]
	fn test_build_memory_service() {
		let config: Config = r#"
[account]
wh_account_id = "42"

[order_service]
primary = "memory"

[order_service.implementations.memory]
"#
		.parse()
		.unwrap();

		let service = build_order_service(&config).unwrap();
		assert_eq!(service.account(), "42");
	}

	#[test]
	fn test_unknown_backend_lists_available() {
		let config: Config = r#"
[account]
wh_account_id = "42"

[order_service]
primary = "grpc"

[order_service.implementations.grpc]
"#
		.parse()
		.unwrap();

		let err = build_order_service(&config).err().unwrap();
		assert!(err.to_string().contains("Available: [http, memory]"));
	}

	struct RegionBackend;

	struct RegionSchema;

	impl ConfigSchema for RegionSchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![Field::new("region", FieldType::String)], vec![]).validate(config)
		}
	}

	#[async_trait::async_trait]
	impl OrderServiceInterface for RegionBackend {
		async fn fetch_orders(
			&self,
			_account: &str,
			_order_id: Option<OrderId>,
		) -> Result<Vec<OrderFlags>, OrderServiceError> {
			Ok(Vec::new())
		}

		async fn update_status(
			&self,
			_account: &str,
			_update: &StatusUpdate,
		) -> Result<(), OrderServiceError> {
			Ok(())
		}

		async fn cancel_order(&self, _order_id: &OrderId) -> Result<(), OrderServiceError> {
			Ok(())
		}

		async fn change_delivery_type(
			&self,
			_order_id: &OrderId,
			_delivery_type: DeliveryType,
		) -> Result<(), OrderServiceError> {
			Ok(())
		}

		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(RegionSchema)
		}
	}

	fn create_region_backend(
		_config: &toml::Value,
	) -> Result<Box<dyn OrderServiceInterface>, OrderServiceError> {
		Ok(Box::new(RegionBackend))
	}

	#[test]
	fn test_backend_schema_checked_after_build() {
		let mut registry = FactoryRegistry::new();
		registry.register_order_service("regional", create_region_backend);

		let missing: Config = r#"
[account]
wh_account_id = "42"

[order_service]
primary = "regional"

[order_service.implementations.regional]
"#
		.parse()
		.unwrap();
		let err = registry.build(&missing).err().unwrap();
		assert!(err.to_string().contains("Invalid configuration for order service 'regional'"));
		assert!(err.to_string().contains("region"));

		let complete: Config = r#"
[account]
wh_account_id = "42"

[order_service]
primary = "regional"

[order_service.implementations.regional]
region = "eu"
"#
		.parse()
		.unwrap();
		assert_eq!(registry.build(&complete).unwrap().account(), "42");
	}

	#[test]
	fn test_backend_config_errors_surface() {
		let config: Config = r#"
[account]
wh_account_id = "42"

[order_service]
primary = "http"

[order_service.implementations.http]
base_url = "ftp://nope"
"#
		.parse()
		.unwrap();

		let err = build_order_service(&config).err().unwrap();
		assert!(err.to_string().contains("base_url"));
	}
}
