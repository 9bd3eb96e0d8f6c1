//! Order list filtering.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use fulfillment_types::{BucketFilter, OrderFlags, RequestedColumn};

use crate::inference::infer_bucket;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
	pub start: NaiveDate,
	pub end: NaiveDate,
}

impl DateWindow {
	pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
		Self { start, end }
	}

	/// The `days` days before `today`, plus `today`. Saturates at the
	/// earliest representable date.
	pub fn ending_on(today: NaiveDate, days: u32) -> Self {
		Self {
			start: today
				.checked_sub_signed(Duration::days(i64::from(days)))
				.unwrap_or(NaiveDate::MIN),
			end: today,
		}
	}

	pub fn contains(&self, date: NaiveDate) -> bool {
		self.start <= date && date <= self.end
	}
}

/// Parses the backend's `order_date`, which comes as RFC 3339, as
/// `YYYY-MM-DD HH:MM:SS`, or as a bare date.
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
	let raw = raw.trim();
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.date_naive())
		.or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
		.or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
		.ok()
}

/// What to keep from an order list. The default query keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
	/// Free text matched against order id and customer name.
	pub text: Option<String>,
	/// Lets `text` also match the customer phone.
	pub search_phone: bool,
	pub bucket: BucketFilter,
	/// When set, delivered orders are kept only if placed inside the window.
	pub delivered_window: Option<DateWindow>,
}

impl OrderQuery {
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	pub fn with_phone_search(mut self) -> Self {
		self.search_phone = true;
		self
	}

	pub fn with_bucket(mut self, bucket: impl Into<BucketFilter>) -> Self {
		self.bucket = bucket.into();
		self
	}

	pub fn with_delivered_window(mut self, window: DateWindow) -> Self {
		self.delivered_window = Some(window);
		self
	}

	/// Lowercased, trimmed search text; `None` when blank.
	fn needle(&self) -> Option<String> {
		self.text
			.as_deref()
			.map(str::trim)
			.filter(|t| !t.is_empty())
			.map(str::to_lowercase)
	}
}

/// Filters order lists against an [`OrderQuery`].
pub struct OrderFilterSet;

impl OrderFilterSet {
	/// Returns the orders matching `query`, in their original order.
	pub fn filter(orders: &[OrderFlags], query: &OrderQuery) -> Vec<OrderFlags> {
		let needle = query.needle();
		orders
			.iter()
			.filter(|order| Self::matches_with(order, query, needle.as_deref()))
			.cloned()
			.collect()
	}

	pub fn matches(order: &OrderFlags, query: &OrderQuery) -> bool {
		Self::matches_with(order, query, query.needle().as_deref())
	}

	fn matches_with(order: &OrderFlags, query: &OrderQuery, needle: Option<&str>) -> bool {
		let bucket = infer_bucket(order);
		query.bucket.matches(bucket)
			&& needle.is_none_or(|needle| matches_text(order, needle, query.search_phone))
			&& query
				.delivered_window
				.is_none_or(|window| bucket != RequestedColumn::Delivered || placed_within(order, &window))
	}
}

fn matches_text(order: &OrderFlags, needle: &str, search_phone: bool) -> bool {
	let contains = |field: Option<&str>| field.is_some_and(|value| value.to_lowercase().contains(needle));
	contains(Some(order.order_id.as_str()))
		|| contains(order.name.as_deref())
		|| (search_phone && contains(order.phone.as_deref()))
}

fn placed_within(order: &OrderFlags, window: &DateWindow) -> bool {
	order
		.order_date
		.as_deref()
		.and_then(parse_order_date)
		.is_some_and(|date| window.contains(date))
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_types::{DeliveryType, Flag};

	fn sample() -> Vec<OrderFlags> {
		let mut delivered_old = OrderFlags::new("1001").with_name("Grace Hopper").with_flag(Flag::Delivered, "Y");
		delivered_old.order_date = Some("2026-01-02 09:30:00".to_string());

		let mut delivered_recent = OrderFlags::new("1002").with_name("Alan Turing").with_flag(Flag::Delivered, "Y");
		delivered_recent.order_date = Some("2026-03-10T12:00:00Z".to_string());

		let mut with_phone = OrderFlags::new("2001").with_name("Edsger Dijkstra").with_flag(Flag::Accepted, "Y");
		with_phone.phone = Some("555-0100".to_string());

		vec![
			delivered_old,
			OrderFlags::new("1003").with_name("Ada Lovelace"),
			with_phone,
			delivered_recent,
			OrderFlags::new("3001")
				.with_name("Barbara Liskov")
				.with_delivery_type(DeliveryType::Driver)
				.with_flag(Flag::GoToPickup, "Y"),
			OrderFlags::new("3002").with_flag(Flag::Cancelled, "Y"),
		]
	}

	fn ids(orders: &[OrderFlags]) -> Vec<&str> {
		orders.iter().map(|o| o.order_id.as_str()).collect()
	}

	#[test]
	fn test_default_query_is_identity() {
		let orders = sample();
		assert_eq!(OrderFilterSet::filter(&orders, &OrderQuery::default()), orders);

		let blank = OrderQuery::default().with_text("   ").with_bucket(BucketFilter::All);
		assert_eq!(OrderFilterSet::filter(&orders, &blank), orders);
	}

	#[test]
	fn test_bucket_filter() {
		let orders = sample();
		let delivered = OrderQuery::default().with_bucket(RequestedColumn::Delivered);
		assert_eq!(ids(&OrderFilterSet::filter(&orders, &delivered)), vec!["1001", "1002"]);

		let in_transit = OrderQuery::default().with_bucket(RequestedColumn::InTransit);
		assert_eq!(ids(&OrderFilterSet::filter(&orders, &in_transit)), vec!["3001"]);

		let pending = OrderQuery::default().with_bucket(RequestedColumn::Pending);
		assert_eq!(ids(&OrderFilterSet::filter(&orders, &pending)), vec!["1003"]);
	}

	#[test]
	fn test_text_filter_is_case_insensitive() {
		let orders = sample();
		let by_name = OrderQuery::default().with_text("  LOVELACE ");
		assert_eq!(ids(&OrderFilterSet::filter(&orders, &by_name)), vec!["1003"]);

		let by_id = OrderQuery::default().with_text("100");
		assert_eq!(
			ids(&OrderFilterSet::filter(&orders, &by_id)),
			vec!["1001", "1003", "2001", "1002"]
		);

		let phone_only = OrderQuery::default().with_text("0100");
		assert!(OrderFilterSet::filter(&orders, &phone_only).is_empty());
	}

	#[test]
	fn test_phone_search_is_opt_in() {
		let orders = sample();
		let by_phone = OrderQuery::default().with_text("555-0100").with_phone_search();
		assert_eq!(ids(&OrderFilterSet::filter(&orders, &by_phone)), vec!["2001"]);

		let by_name = OrderQuery::default().with_text("dijkstra").with_phone_search();
		assert_eq!(ids(&OrderFilterSet::filter(&orders, &by_name)), vec!["2001"]);
	}

	#[test]
	fn test_filters_compose() {
		let orders = sample();
		let query = OrderQuery::default().with_text("a").with_bucket(RequestedColumn::Delivered);
		assert_eq!(ids(&OrderFilterSet::filter(&orders, &query)), vec!["1001", "1002"]);

		let none = OrderQuery::default().with_text("liskov").with_bucket(RequestedColumn::Pending);
		assert!(OrderFilterSet::filter(&orders, &none).is_empty());
	}

	#[test]
	fn test_delivered_window_only_affects_delivered() {
		let orders = sample();
		let today = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
		let query = OrderQuery::default().with_delivered_window(DateWindow::ending_on(today, 7));
		assert_eq!(
			ids(&OrderFilterSet::filter(&orders, &query)),
			vec!["1003", "2001", "1002", "3001", "3002"]
		);
	}

	#[test]
	fn test_huge_window_saturates() {
		let today = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
		let window = DateWindow::ending_on(today, u32::MAX);
		assert_eq!(window.start, NaiveDate::MIN);
		assert_eq!(window.end, today);
		assert!(window.contains(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()));
	}

	#[test]
	fn test_filter_is_idempotent() {
		let orders = sample();
		let today = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
		let queries = [
			OrderQuery::default(),
			OrderQuery::default().with_text("a"),
			OrderQuery::default().with_bucket(RequestedColumn::Delivered),
			OrderQuery::default().with_delivered_window(DateWindow::ending_on(today, 3)),
		];
		for query in queries {
			let once = OrderFilterSet::filter(&orders, &query);
			assert_eq!(OrderFilterSet::filter(&once, &query), once);
		}
	}

	#[test]
	fn test_parse_order_date_formats() {
		let expected = NaiveDate::from_ymd_opt(2026, 2, 14);
		assert_eq!(parse_order_date("2026-02-14"), expected);
		assert_eq!(parse_order_date("2026-02-14 18:45:00"), expected);
		assert_eq!(parse_order_date("2026-02-14T18:45:00+02:00"), expected);
		assert_eq!(parse_order_date("14/02/2026"), None);
	}
}
