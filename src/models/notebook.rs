//! Container for all notes loaded in the application
use super::Note;

#[derive(Clone, Default)]
pub struct Notebook {
    pub notes: Vec<Note>,
}

impl Notebook {
    pub fn find(&self, title: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.title == title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.find(title).is_some()
    }

    /// Drops a note from memory. Returns false if no note had that title.
    pub fn remove(&mut self, title: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.title != title);
        self.notes.len() != before
    }
}
