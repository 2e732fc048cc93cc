//! JSON import/export module for notes.
//! Saves and loads a Note with its flashcards to/from JSON files. Review history is not exported.

use crate::error::Result;
use crate::models::Note;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Exports a note to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_json_to_path(note: &Note, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json_string = serde_json::to_string_pretty(note)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    log::info!("Note '{}' exported to '{}'", note.title, path.display());
    Ok(())
}

/// Imports a note from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: impl AsRef<Path>) -> Result<Note> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let note: Note = serde_json::from_str(&contents)?;

    log::info!("Note '{}' imported from '{}'", note.title, path.display());
    Ok(note)
}
