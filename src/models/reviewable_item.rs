//! A flashcard as seen by the review scheduler: its prompt plus review history.
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewableItem {
    pub id: String,
    pub prompt_text: String,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub times_reviewed: i32,
    /// `None` until the item has been answered at least once.
    pub last_outcome_correct: Option<bool>,
}

impl ReviewableItem {
    /// Creates an item that has never been reviewed.
    pub fn new(id: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt_text: prompt_text.into(),
            last_reviewed_at: None,
            times_reviewed: 0,
            last_outcome_correct: None,
        }
    }

    /// Review count with malformed negative values treated as "never reviewed".
    pub fn review_count(&self) -> i32 {
        self.times_reviewed.max(0)
    }

    pub fn is_weak(&self) -> bool {
        self.last_outcome_correct == Some(false)
    }

    /// Applies one completed review to the item's history.
    pub fn record_review(&mut self, correct: bool, at: DateTime<Utc>) {
        self.times_reviewed = self.review_count() + 1;
        self.last_reviewed_at = Some(at);
        self.last_outcome_correct = Some(correct);
    }
}
