//! Review session over the flashcards that are due today.
//! Handles multi-round review where wrongly answered cards come back until answered correctly.

use super::scheduler::select_due_items;
use super::{Flashcard, ReviewableItem};
use crate::database::db;
use crate::error::{Result, StudyError};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// A due flashcard with its review history and per-session state
#[derive(Clone, Debug)]
pub struct ReviewCard {
    pub flashcard: Flashcard,
    pub item: ReviewableItem,
    /// Last answer before this session started was wrong
    pub is_weak: bool,
    /// Answered correctly in the current round
    pub passed: bool,
}

/// Manages a review session with multiple rounds.
/// Cards answered wrong are repeated in subsequent rounds.
pub struct ReviewSession {
    pub note_title: String,
    pub cards: Vec<ReviewCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_answer: bool,
    pub conn: Arc<Mutex<Connection>>,
    pub round_number: usize,
}

impl ReviewSession {
    /// Loads a note's flashcards and keeps the ones due at the stored current date.
    pub fn start(note_title: &str, conn: Arc<Mutex<Connection>>) -> Result<Self> {
        let (cards, now) = {
            let guard = conn.lock().map_err(|_| StudyError::LockPoisoned)?;
            (
                db::load_review_cards(note_title, &guard)?,
                db::get_current_date(&guard)?,
            )
        };

        let items: Vec<ReviewableItem> = cards.iter().map(|(_, item)| item.clone()).collect();
        let selection = select_due_items(&items, now);

        // select_due_items keeps input order, so due items line up with cards in order
        let mut due = selection.due.into_iter().peekable();
        let due_cards = cards
            .into_iter()
            .filter(|(_, item)| {
                if due.peek().is_some_and(|d| d.id == item.id) {
                    due.next();
                    true
                } else {
                    false
                }
            })
            .collect::<Vec<_>>();

        log::info!(
            "Review of '{}' started: {} due, {} weak",
            note_title,
            due_cards.len(),
            selection.weak.len()
        );

        Ok(Self::new_from_due_cards(
            note_title.to_string(),
            due_cards,
            conn,
        ))
    }

    /// Creates a session from cards already selected as due.
    pub fn new_from_due_cards(
        note_title: String,
        cards: Vec<(Flashcard, ReviewableItem)>,
        conn: Arc<Mutex<Connection>>,
    ) -> Self {
        let cards: Vec<_> = cards
            .into_iter()
            .map(|(flashcard, item)| ReviewCard {
                is_weak: item.is_weak(),
                flashcard,
                item,
                passed: false,
            })
            .collect();

        let indices: Vec<usize> = (0..cards.len()).collect();

        Self {
            note_title,
            cards,
            current_round_cards: indices,
            current_index: 0,
            show_answer: false,
            conn,
            round_number: 1,
        }
    }

    pub fn current_card(&self) -> Option<&ReviewCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.cards.get(idx))
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_answer = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards answered wrong.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| self.cards.get(idx).is_some_and(|card| !card.passed))
            .collect();

        if failed.is_empty() {
            return;
        }

        self.current_round_cards = failed;
        self.current_index = 0;
        self.show_answer = false;
        self.round_number += 1;
        log::debug!(
            "Round {} of '{}': {} cards to retry",
            self.round_number,
            self.note_title,
            self.current_round_cards.len()
        );
    }

    /// Records the answer to the current card at the stored current date.
    pub fn grade_current_card(&mut self, correct: bool) -> Result<()> {
        let Some(&idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(());
        };
        let Some(card) = self.cards.get_mut(idx) else {
            return Ok(());
        };

        let conn = self.conn.lock().map_err(|_| StudyError::LockPoisoned)?;
        let now = db::get_current_date(&conn)?;
        card.item = db::record_review(&card.item.id, correct, now, &conn)?;
        card.passed = correct;

        Ok(())
    }

    pub fn passed_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| self.cards.get(idx).is_some_and(|card| card.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    pub fn weak_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_weak).count()
    }

    /// Returns true when nothing was due or every card in the round was answered correctly.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.passed_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} cards answered wrong",
                self.round_number,
                self.total_count()
            )
        }
    }
}
