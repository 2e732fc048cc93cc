//! Review scheduler for spaced repetition practice.
//!
//! Items are due on a fixed graduated schedule keyed by how many times they
//! have been reviewed:
//! - never reviewed: always due
//! - 1 review: due after 1 day
//! - 2 reviews: due after 3 days
//! - 3 reviews: due after 7 days
//! - 4 or more reviews: due after 14 days
//!
//! Independently of that, items whose last answer was wrong are collected as
//! "weak" so they can be highlighted.

use super::ReviewableItem;
use chrono::{DateTime, Duration, Utc};

/// Days reported for an item that has never been reviewed.
pub const NEVER_REVIEWED_DAYS: i64 = 999;

/// Outcome of a scheduling pass. Both lists keep the input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DueItems {
    pub due: Vec<ReviewableItem>,
    pub weak: Vec<ReviewableItem>,
}

/// Minimum whole days between reviews for the given review count.
pub fn review_interval_days(times_reviewed: i32) -> i64 {
    match times_reviewed {
        i32::MIN..=0 => 0,
        1 => 1,
        2 => 3,
        3 => 7,
        _ => 14,
    }
}

/// Whole days elapsed since the last review, rounded down.
///
/// Never-reviewed items report [`NEVER_REVIEWED_DAYS`]; a review timestamp in
/// the future counts as zero days.
pub fn days_since_review(item: &ReviewableItem, now: DateTime<Utc>) -> i64 {
    match item.last_reviewed_at {
        Some(last) if item.review_count() > 0 => (now - last).num_days().max(0),
        _ => NEVER_REVIEWED_DAYS,
    }
}

pub fn is_due(item: &ReviewableItem, now: DateTime<Utc>) -> bool {
    days_since_review(item, now) >= review_interval_days(item.review_count())
}

/// Moment the item becomes due again, or `None` if it has never been reviewed.
pub fn next_due_at(item: &ReviewableItem) -> Option<DateTime<Utc>> {
    if item.review_count() == 0 {
        return None;
    }
    item.last_reviewed_at
        .map(|last| last + Duration::days(review_interval_days(item.review_count())))
}

/// Splits `items` into the ones due at `now` and the ones last answered wrong.
/// An item may appear in both lists. The input is not modified.
pub fn select_due_items(items: &[ReviewableItem], now: DateTime<Utc>) -> DueItems {
    let due = items
        .iter()
        .filter(|item| is_due(item, now))
        .cloned()
        .collect();

    let weak = items.iter().filter(|item| item.is_weak()).cloned().collect();

    DueItems { due, weak }
}
