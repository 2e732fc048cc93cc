//! Error type shared by storage, import/export and configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Flashcard not found: {0}")]
    FlashcardNotFound(String),

    #[error("Note '{0}' already exists")]
    DuplicateNote(String),

    #[error("Invalid stored date: {0}")]
    InvalidDate(String),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StudyError>;
