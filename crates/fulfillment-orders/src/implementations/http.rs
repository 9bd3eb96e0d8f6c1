//! HTTP Order Service backend.
//!
//! Talks to the marketplace REST API. Every endpoint is a `POST` and answers
//! with an [`ApiEnvelope`] whose `status` is `1` on success.

use crate::{OrderServiceError, OrderServiceInterface};
use async_trait::async_trait;
use fulfillment_types::{
	ApiEnvelope, BackendOperation, ConfigSchema, DeliveryType, Field, FieldType, OrderFlags,
	OrderId, Schema, SecretString, ShipperOrders, StatusUpdate, ValidationError,
};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Largest page the listing endpoint accepts. Orders are fetched in one page
/// and paginated locally.
const LIST_PAGE_ITEMS: u32 = 1000;

/// Order Service backed by the REST API.
pub struct HttpOrderService {
	client: reqwest::Client,
	base_url: String,
	auth_token: Option<SecretString>,
}

impl HttpOrderService {
	pub fn new(
		base_url: impl Into<String>,
		auth_token: Option<SecretString>,
		timeout: Duration,
	) -> Result<Self, OrderServiceError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| OrderServiceError::Configuration(format!("HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			auth_token: auth_token.and_then(SecretString::non_empty),
		})
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path)
	}

	fn post(&self, path: &str) -> RequestBuilder {
		let request = self.client.post(self.endpoint(path));
		match &self.auth_token {
			Some(token) => request.bearer_auth(token.expose_secret()),
			None => request,
		}
	}

	/// Sends a request and unwraps the response envelope.
	async fn send<T: DeserializeOwned>(
		&self,
		request: RequestBuilder,
	) -> Result<Option<T>, OrderServiceError> {
		let response = request
			.send()
			.await
			.map_err(|e| OrderServiceError::Network(e.to_string()))?;
		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| OrderServiceError::Network(e.to_string()))?;

		if !status.is_success() {
			return Err(OrderServiceError::Rejected(format!(
				"HTTP {}: {}",
				status,
				envelope_message(&body).unwrap_or_else(|| body.chars().take(200).collect())
			)));
		}

		decode_envelope(&body)
	}
}

/// Unwraps a successful envelope into its optional `data`.
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Option<T>, OrderServiceError> {
	let envelope: ApiEnvelope<T> =
		serde_json::from_str(body).map_err(|e| OrderServiceError::Decode(e.to_string()))?;
	if !envelope.is_success() {
		return Err(OrderServiceError::Rejected(
			envelope
				.message
				.unwrap_or_else(|| format!("status {}", envelope.status)),
		));
	}
	Ok(envelope.data)
}

/// Best-effort extraction of `message` from an error body.
fn envelope_message(body: &str) -> Option<String> {
	serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
		.ok()
		.and_then(|envelope| envelope.message)
}

/// Text fields of an `OrderStatusUpdate` form.
fn status_form_fields(account: &str, update: &StatusUpdate) -> Vec<(&'static str, String)> {
	let mut fields = vec![
		("wh_account_id", account.to_string()),
		("order_id", update.order_id.to_string()),
		("status", "Y".to_string()),
		("status_type", update.operation.to_string()),
	];

	if update.operation == BackendOperation::OrderDelivered {
		let evidence = update.evidence.clone().unwrap_or_default();
		let drunk = if evidence.visibly_intoxicated { "Y" } else { "N" };
		fields.push(("visible_drunk", drunk.to_string()));
		fields.push(("package_received_by", evidence.package_received_by));
		fields.push(("driver_note", evidence.driver_note));
	}
	fields
}

fn status_form(account: &str, update: &StatusUpdate) -> Form {
	let mut form = status_form_fields(account, update)
		.into_iter()
		.fold(Form::new(), |form, (name, value)| form.text(name, value));

	if let Some(evidence) = update
		.evidence
		.as_ref()
		.filter(|_| update.operation == BackendOperation::OrderDelivered)
	{
		if let Some(proof) = &evidence.delivery_proof {
			form = form.part(
				"delivery_proof",
				Part::bytes(proof.clone()).file_name("delivery_proof.png"),
			);
		}
		if evidence.has_signature() {
			form = form.part(
				"customer_signature",
				Part::bytes(evidence.customer_signature.clone()).file_name("signature.png"),
			);
		}
	}
	form
}

#[async_trait]
impl OrderServiceInterface for HttpOrderService {
	async fn fetch_orders(
		&self,
		account: &str,
		order_id: Option<OrderId>,
	) -> Result<Vec<OrderFlags>, OrderServiceError> {
		debug!(account, ?order_id, "Requesting shipper orders");
		let body = json!({
			"wh_account_id": account,
			"order_id": order_id.map(|id| id.to_string()).unwrap_or_default(),
			"page": 1,
			"items": LIST_PAGE_ITEMS,
			"type": "All",
		});
		let data: Option<ShipperOrders> = self.send(self.post("getShipperOrders").json(&body)).await?;
		Ok(data.map(|d| d.orders).unwrap_or_default())
	}

	async fn update_status(
		&self,
		account: &str,
		update: &StatusUpdate,
	) -> Result<(), OrderServiceError> {
		debug!(order_id = %update.order_id, status_type = %update.operation, "Sending status update");
		self.send::<serde_json::Value>(
			self.post("OrderStatusUpdate")
				.multipart(status_form(account, update)),
		)
		.await
		.map(|_| ())
	}

	async fn cancel_order(&self, order_id: &OrderId) -> Result<(), OrderServiceError> {
		debug!(%order_id, "Sending cancellation");
		let body = json!({ "order_id": order_id, "status": "Y" });
		self.send::<serde_json::Value>(self.post("OrderCancelled").json(&body))
			.await
			.map(|_| ())
	}

	async fn change_delivery_type(
		&self,
		order_id: &OrderId,
		delivery_type: DeliveryType,
	) -> Result<(), OrderServiceError> {
		let Some(wire) = delivery_type.as_str() else {
			return Err(OrderServiceError::Rejected(
				"Delivery type cannot be reset to unset".into(),
			));
		};
		debug!(%order_id, delivery_type = wire, "Changing delivery type");
		let body = json!({ "order_id": order_id, "delivery_type": wire });
		self.send::<serde_json::Value>(self.post("change-delivery-type").json(&body))
			.await
			.map(|_| ())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpOrderServiceSchema)
	}
}

/// Configuration schema for [`HttpOrderService`].
pub struct HttpOrderServiceSchema;

impl ConfigSchema for HttpOrderServiceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
						Ok(())
					},
					_ => Err("must start with http:// or https://".to_string()),
				}
			})],
			vec![
				Field::new("auth_token", FieldType::String),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create an HTTP backend from configuration.
///
/// Configuration parameters:
/// - `base_url`: API root, e.g. `https://api.example.com/api`
/// - `auth_token` (optional): bearer token; empty means no auth header
/// - `timeout_seconds` (optional, default 30): per-request timeout
pub fn create_order_service(
	config: &toml::Value,
) -> Result<Box<dyn OrderServiceInterface>, OrderServiceError> {
	HttpOrderServiceSchema
		.validate(config)
		.map_err(|e| OrderServiceError::Configuration(format!("Invalid configuration: {}", e)))?;

	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| OrderServiceError::Configuration("base_url is required".into()))?;
	let auth_token = config
		.get("auth_token")
		.and_then(|v| v.as_str())
		.map(SecretString::from);
	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.and_then(|v| u64::try_from(v).ok())
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(HttpOrderService::new(
		base_url,
		auth_token,
		Duration::from_secs(timeout_seconds),
	)?))
}

/// Registry for the HTTP backend.
pub struct Registry;

impl fulfillment_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = crate::OrderServiceFactory;

	fn factory() -> Self::Factory {
		create_order_service
	}
}

impl crate::OrderServiceRegistry for Registry {}
