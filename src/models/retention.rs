//! Per-note snapshot of how well its flashcards are retained.
use super::ReviewableItem;
use super::scheduler::select_due_items;
use chrono::{DateTime, Utc};

/// Reviews after which a correctly answered item counts as mastered.
pub const MASTERED_AFTER_REVIEWS: i32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetentionSummary {
    pub total: usize,
    pub due: usize,
    pub weak: usize,
    pub never_reviewed: usize,
    pub mastered: usize,
}

impl RetentionSummary {
    pub fn from_items(items: &[ReviewableItem], now: DateTime<Utc>) -> Self {
        let selection = select_due_items(items, now);

        Self {
            total: items.len(),
            due: selection.due.len(),
            weak: selection.weak.len(),
            never_reviewed: items.iter().filter(|i| i.review_count() == 0).count(),
            mastered: items
                .iter()
                .filter(|i| {
                    i.review_count() >= MASTERED_AFTER_REVIEWS
                        && i.last_outcome_correct == Some(true)
                })
                .count(),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{} due, {} weak, {} new, {}/{} mastered",
            self.due, self.weak, self.never_reviewed, self.mastered, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_summary_counts() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut mastered = ReviewableItem::new("1", "a");
        mastered.times_reviewed = 5;
        mastered.last_reviewed_at = Some(now - Duration::days(1));
        mastered.last_outcome_correct = Some(true);

        let mut weak = ReviewableItem::new("2", "b");
        weak.times_reviewed = 1;
        weak.last_reviewed_at = Some(now - Duration::days(2));
        weak.last_outcome_correct = Some(false);

        let fresh = ReviewableItem::new("3", "c");

        let summary = RetentionSummary::from_items(&[mastered, weak, fresh], now);
        assert_eq!(
            summary,
            RetentionSummary {
                total: 3,
                due: 2,
                weak: 1,
                never_reviewed: 1,
                mastered: 1,
            }
        );
        assert_eq!(summary.describe(), "2 due, 1 weak, 1 new, 1/3 mastered");
    }

    #[test]
    fn test_empty_summary() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            RetentionSummary::from_items(&[], now),
            RetentionSummary::default()
        );
    }
}
