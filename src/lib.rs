pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use config::AppConfig;
pub use error::{Result, StudyError};
pub use models::{
    DueItems, Flashcard, Note, Notebook, RetentionSummary, ReviewSession, ReviewableItem,
    select_due_items,
};
