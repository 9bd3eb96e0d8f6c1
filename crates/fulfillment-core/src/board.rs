//! Board grouping, bucket counts and pagination.

use fulfillment_types::{BoardColumn, DeliveryType, OrderFlags, RequestedColumn};
use std::collections::BTreeMap;

use crate::filter::{OrderFilterSet, OrderQuery};
use crate::inference::{infer_bucket, infer_state};

/// One visible board column with its orders.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
	pub column: BoardColumn,
	pub orders: Vec<OrderFlags>,
}

/// Orders grouped into the visible columns of a board.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
	pub lanes: Vec<Lane>,
}

impl Board {
	/// Groups `orders` into the visible `columns`, keeping configured column
	/// order and input order within a lane. The query's bucket selector is
	/// ignored: every lane has its own bucket.
	pub fn group(orders: &[OrderFlags], columns: &[BoardColumn], query: &OrderQuery) -> Self {
		let query = OrderQuery {
			bucket: Default::default(),
			..query.clone()
		};
		let matching = OrderFilterSet::filter(orders, &query);

		let lanes = columns
			.iter()
			.filter(|column| column.visible)
			.map(|column| Lane {
				column: column.clone(),
				orders: matching
					.iter()
					.filter(|order| infer_bucket(order) == column.id)
					.cloned()
					.collect(),
			})
			.collect();

		Self { lanes }
	}

	pub fn lane(&self, id: RequestedColumn) -> Option<&Lane> {
		self.lanes.iter().find(|lane| lane.column.id == id)
	}
}

/// Number of orders per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketCounts {
	pub all: usize,
	pub by_bucket: BTreeMap<RequestedColumn, usize>,
}

impl BucketCounts {
	pub fn tally(orders: &[OrderFlags]) -> Self {
		let mut by_bucket: BTreeMap<RequestedColumn, usize> =
			RequestedColumn::ALL.iter().map(|c| (*c, 0)).collect();
		for order in orders {
			*by_bucket.entry(infer_bucket(order)).or_default() += 1;
		}
		Self {
			all: orders.len(),
			by_bucket,
		}
	}

	pub fn get(&self, column: RequestedColumn) -> usize {
		self.by_bucket.get(&column).copied().unwrap_or(0)
	}
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
	pub items: Vec<T>,
	/// 1-based page number actually returned.
	pub page: usize,
	pub per_page: usize,
	pub total_items: usize,
	pub total_pages: usize,
}

/// Cuts `items` into pages of `per_page` and returns the requested 1-based
/// page, clamped into range. A `per_page` of zero is treated as one.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
	let per_page = per_page.max(1);
	let total_pages = items.len().div_ceil(per_page);
	let page = page.clamp(1, total_pages.max(1));
	let start = (page - 1) * per_page;

	Page {
		items: items.iter().skip(start).take(per_page).cloned().collect(),
		page,
		per_page,
		total_items: items.len(),
		total_pages,
	}
}

/// True while any driver order is still open. Driver orders change through
/// the driver app, so the list has to be re-fetched to see their progress.
pub fn needs_polling(orders: &[OrderFlags]) -> bool {
	orders
		.iter()
		.any(|order| order.delivery_type == DeliveryType::Driver && !infer_state(order).is_terminal())
}
