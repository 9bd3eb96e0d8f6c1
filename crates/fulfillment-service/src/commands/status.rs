//! Status changes: check, advance and cancel.

use fulfillment_core::{infer_state, TransitionValidator};
use fulfillment_orders::OrderService;
use fulfillment_types::{DeliveryEvidence, OrderId, RequestedColumn};
use std::path::Path;

use super::{render, EvidenceArgs};

async fn read_file(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	tokio::fs::read(path)
		.await
		.map_err(|e| format!("Cannot read {}: {}", path.display(), e).into())
}

/// Builds delivery evidence from the flags. `None` when no evidence was given.
async fn read_evidence(
	args: &EvidenceArgs,
) -> Result<Option<DeliveryEvidence>, Box<dyn std::error::Error>> {
	let given = args.signature.is_some()
		|| args.proof.is_some()
		|| args.received_by.is_some()
		|| args.note.is_some()
		|| args.visibly_intoxicated;
	if !given {
		return Ok(None);
	}

	let mut evidence = DeliveryEvidence {
		package_received_by: args.received_by.clone().unwrap_or_default(),
		driver_note: args.note.clone().unwrap_or_default(),
		visibly_intoxicated: args.visibly_intoxicated,
		..Default::default()
	};
	if let Some(path) = &args.signature {
		evidence.customer_signature = read_file(path).await?;
	}
	if let Some(path) = &args.proof {
		evidence.delivery_proof = Some(read_file(path).await?);
	}
	Ok(Some(evidence))
}

pub async fn check(
	service: &OrderService,
	order_id: &OrderId,
	to: RequestedColumn,
	signature: Option<&Path>,
) -> Result<String, Box<dyn std::error::Error>> {
	let order = service.fetch_order(order_id).await?;
	let evidence = match signature {
		Some(path) => Some(DeliveryEvidence::with_signature(read_file(path).await?)),
		None => None,
	};

	let state = infer_state(&order);
	let verdict = TransitionValidator::check(state, order.delivery_type, to, evidence.as_ref());
	let targets: Vec<String> = TransitionValidator::targets(state, order.delivery_type)
		.iter()
		.map(ToString::to_string)
		.collect();

	Ok(format!(
		"{}\n{}\nreachable: {}",
		render::order_line(&order),
		render::verdict(&order, to, &verdict),
		if targets.is_empty() {
			"none".to_string()
		} else {
			targets.join(", ")
		}
	))
}

pub async fn advance(
	service: &OrderService,
	order_id: &OrderId,
	to: RequestedColumn,
	evidence: &EvidenceArgs,
) -> Result<String, Box<dyn std::error::Error>> {
	let order = service.fetch_order(order_id).await?;
	let evidence = read_evidence(evidence).await?;
	let plan = service.advance(&order, to, evidence).await?;

	let updated = service.fetch_order(order_id).await?;
	Ok(format!(
		"applied {}\n{}",
		plan.operation,
		render::order_line(&updated)
	))
}

pub async fn cancel(
	service: &OrderService,
	order_id: &OrderId,
) -> Result<String, Box<dyn std::error::Error>> {
	let order = service.fetch_order(order_id).await?;
	service.cancel(&order).await?;
	let updated = service.fetch_order(order_id).await?;
	Ok(format!("cancelled\n{}", render::order_line(&updated)))
}
