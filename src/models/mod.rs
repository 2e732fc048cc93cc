pub mod flashcard;
pub mod note;
pub mod notebook;
pub mod retention;
pub mod review_session;
pub mod reviewable_item;
pub mod scheduler;

pub use flashcard::Flashcard;
pub use note::Note;
pub use notebook::Notebook;
pub use retention::RetentionSummary;
pub use review_session::{ReviewCard, ReviewSession};
pub use reviewable_item::ReviewableItem;
pub use scheduler::{DueItems, select_due_items};
