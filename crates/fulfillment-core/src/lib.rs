//! Order status engine.
//!
//! Pure, synchronous functions over order records fetched from the Order
//! Service:
//!
//! - [`inference`] derives a [`LifecycleState`](fulfillment_types::LifecycleState)
//!   from an order's sparse flags,
//! - [`transition`] decides whether a requested column change is legal and
//!   which backend operation performs it,
//! - [`filter`] narrows order lists by bucket, text and delivery date,
//! - [`board`] groups, counts and paginates filtered orders,
//! - [`tracker`] reports state changes between two polls.
//!
//! Nothing here performs I/O or caches derived states; callers re-run the
//! engine on every freshly fetched list.

pub mod board;
pub mod filter;
pub mod inference;
pub mod tracker;
pub mod transition;

pub use board::{needs_polling, paginate, Board, BucketCounts, Lane, Page};
pub use filter::{DateWindow, OrderFilterSet, OrderQuery};
pub use inference::{infer_bucket, infer_state};
pub use tracker::{StatusChange, StatusTracker};
pub use transition::{
	can_transition, DenialReason, PlannedTransition, TransitionError, TransitionValidator,
	TransitionVerdict,
};
