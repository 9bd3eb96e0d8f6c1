//! Read-only views: the paginated list and the board.

use chrono::NaiveDate;
use fulfillment_config::BoardConfig;
use fulfillment_core::{paginate, Board, BucketCounts, DateWindow, OrderFilterSet, OrderQuery};
use fulfillment_orders::{OrderService, OrderServiceError};

use super::{render, ListArgs};

fn search_query(search: Option<&str>) -> OrderQuery {
	match search {
		Some(text) => OrderQuery::default().with_text(text),
		None => OrderQuery::default(),
	}
}

/// Counts cover every bucket of the searched orders; the page holds only the
/// selected bucket.
pub async fn list(
	service: &OrderService,
	board: &BoardConfig,
	args: &ListArgs,
) -> Result<String, OrderServiceError> {
	let orders = service.fetch_orders().await?;
	let searched = OrderFilterSet::filter(&orders, &search_query(args.search.as_deref()));
	let counts = BucketCounts::tally(&searched);

	let selected = OrderFilterSet::filter(&searched, &OrderQuery::default().with_bucket(args.bucket));
	let page = paginate(&selected, args.page, board.page_size);
	Ok(render::list(&page, &counts, args.bucket))
}

/// Like the list, but the search also matches customer phones.
pub async fn board(
	service: &OrderService,
	board: &BoardConfig,
	search: Option<&str>,
	today: NaiveDate,
) -> Result<String, OrderServiceError> {
	let orders = service.fetch_orders().await?;
	let mut query = search_query(search).with_phone_search();
	if board.delivered_window_days > 0 {
		query = query.with_delivered_window(DateWindow::ending_on(today, board.delivered_window_days));
	}
	Ok(render::board(&Board::group(&orders, &board.columns, &query)))
}
