//! Note is a titled piece of study material together with the flashcards made from it
use super::Flashcard;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            flashcards: Vec::new(),
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new("My Note")
    }
}
