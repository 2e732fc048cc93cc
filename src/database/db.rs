//! Database operations for the study assistant
//!
//! Handles SQLite database initialization, CRUD operations for notes and flashcards,
//! review history updates and the simulated current date used for scheduling.

use crate::error::{Result, StudyError};
use crate::models::{Flashcard, Note, Notebook, ReviewableItem};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

fn to_timestamp(date: DateTime<Utc>) -> i64 {
    date.timestamp()
}

fn from_timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Opens (or creates) the database file and makes sure all tables exist
pub fn init_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    log::info!("Database ready at {}", path.display());
    Ok(conn)
}

/// Creates tables for notes, flashcards with their review history, and app state.
/// Sets current date to now if not already initialized.
pub fn create_schema(conn: &Connection) -> Result<()> {
    // Needed for ON DELETE CASCADE; SQLite keeps it off per connection by default
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notes (
            title TEXT PRIMARY KEY,
            content TEXT NOT NULL DEFAULT ''
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            note_title TEXT NOT NULL,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            times_reviewed INTEGER NOT NULL DEFAULT 0,
            last_reviewed_at INTEGER,
            last_outcome_correct INTEGER,
            FOREIGN KEY (note_title) REFERENCES notes(title) ON DELETE CASCADE,
            UNIQUE(note_title, question)
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![to_timestamp(Utc::now()).to_string()],
    )?;

    Ok(())
}

/// Retrieves current simulated date from database
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let timestamp: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    timestamp
        .parse::<i64>()
        .ok()
        .and_then(from_timestamp)
        .ok_or(StudyError::InvalidDate(timestamp))
}

/// Overwrites the simulated date
pub fn set_current_date(date: DateTime<Utc>, conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![to_timestamp(date).to_string()],
    )?;
    Ok(())
}

/// Advances current date by 24 hours (for practicing spaced repetition)
pub fn advance_day(conn: &Connection) -> Result<DateTime<Utc>> {
    let next_day = get_current_date(conn)? + Duration::days(1);
    set_current_date(next_day, conn)?;
    log::debug!("Simulated date advanced to {}", next_day);
    Ok(next_day)
}

fn note_exists(title: &str, conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM notes WHERE title = ?1",
            params![title],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Creates a new note in the database
pub fn new_note(title: &str, content: &str, conn: &Connection) -> Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO notes (title, content) VALUES (?1, ?2)",
        params![title, content],
    )?;
    if inserted == 0 {
        return Err(StudyError::DuplicateNote(title.to_string()));
    }
    log::info!("Note '{}' created", title);
    Ok(())
}

/// Deletes a note; its flashcards and their review history go with it
pub fn delete_note(title: &str, conn: &Connection) -> Result<()> {
    let deleted = conn.execute("DELETE FROM notes WHERE title = ?1", params![title])?;
    if deleted == 0 {
        return Err(StudyError::NoteNotFound(title.to_string()));
    }
    log::info!("Note '{}' deleted", title);
    Ok(())
}

/// Adds a flashcard to a note with an empty review history
///
/// Returns the flashcard ID. If the flashcard already exists (same note + question),
/// the existing one is kept and its ID returned.
pub fn add_flashcard(
    note_title: &str,
    question: &str,
    answer: &str,
    conn: &Connection,
) -> Result<i64> {
    if !note_exists(note_title, conn)? {
        return Err(StudyError::NoteNotFound(note_title.to_string()));
    }

    conn.execute(
        "INSERT OR IGNORE INTO flashcards (note_title, question, answer) VALUES (?1, ?2, ?3)",
        params![note_title, question, answer],
    )?;

    let flashcard_id: i64 = conn.query_row(
        "SELECT id FROM flashcards WHERE note_title = ?1 AND question = ?2",
        params![note_title, question],
        |row| row.get(0),
    )?;

    Ok(flashcard_id)
}

fn review_card_from_row(row: &Row) -> rusqlite::Result<(Flashcard, ReviewableItem)> {
    let id: i64 = row.get(0)?;
    let question: String = row.get(1)?;
    let last_reviewed_at: Option<i64> = row.get(4)?;

    Ok((
        Flashcard {
            question: question.clone(),
            answer: row.get(2)?,
        },
        ReviewableItem {
            id: id.to_string(),
            prompt_text: question,
            times_reviewed: row.get(3)?,
            last_reviewed_at: last_reviewed_at
                .map(|secs| {
                    from_timestamp(secs).ok_or(rusqlite::Error::IntegralValueOutOfRange(4, secs))
                })
                .transpose()?,
            last_outcome_correct: row.get(5)?,
        },
    ))
}

const REVIEW_CARD_COLUMNS: &str =
    "id, question, answer, times_reviewed, last_reviewed_at, last_outcome_correct";

/// Retrieves every flashcard of a note with its review history, in insertion order
pub fn load_review_cards(
    note_title: &str,
    conn: &Connection,
) -> Result<Vec<(Flashcard, ReviewableItem)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM flashcards WHERE note_title = ?1 ORDER BY id ASC",
        REVIEW_CARD_COLUMNS
    ))?;

    let cards = stmt
        .query_map(params![note_title], review_card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(cards)
}

/// Retrieves the scheduler's view of a note's flashcards
pub fn load_reviewable_items(note_title: &str, conn: &Connection) -> Result<Vec<ReviewableItem>> {
    Ok(load_review_cards(note_title, conn)?
        .into_iter()
        .map(|(_, item)| item)
        .collect())
}

/// Retrieves all flashcards for a given note
pub fn get_flashcards_for_note(note_title: &str, conn: &Connection) -> Result<Vec<Flashcard>> {
    Ok(load_review_cards(note_title, conn)?
        .into_iter()
        .map(|(card, _)| card)
        .collect())
}

/// Records one answered review and returns the updated item
pub fn record_review(
    flashcard_id: &str,
    correct: bool,
    at: DateTime<Utc>,
    conn: &Connection,
) -> Result<ReviewableItem> {
    let not_found = || StudyError::FlashcardNotFound(flashcard_id.to_string());
    let id: i64 = flashcard_id.parse().map_err(|_| not_found())?;

    let (_, mut item) = conn
        .query_row(
            &format!(
                "SELECT {} FROM flashcards WHERE id = ?1",
                REVIEW_CARD_COLUMNS
            ),
            params![id],
            review_card_from_row,
        )
        .optional()?
        .ok_or_else(not_found)?;

    item.record_review(correct, at);

    conn.execute(
        "UPDATE flashcards
         SET times_reviewed = ?1, last_reviewed_at = ?2, last_outcome_correct = ?3
         WHERE id = ?4",
        params![
            item.times_reviewed,
            item.last_reviewed_at.map(to_timestamp),
            item.last_outcome_correct,
            id
        ],
    )?;

    log::debug!(
        "Recorded review of flashcard {} (correct: {}, reviews: {})",
        id,
        correct,
        item.times_reviewed
    );
    Ok(item)
}

/// Stores an imported note with its complete flashcards in one transaction
///
/// Returns the note as it was stored: blank cards are skipped and repeated
/// questions keep their first answer. Nothing is written if any insert fails.
pub fn import_note(note: &Note, conn: &Connection) -> Result<Note> {
    let tx = conn.unchecked_transaction()?;

    new_note(&note.title, &note.content, &tx)?;
    for flashcard in note.flashcards.iter().filter(|f| f.is_complete()) {
        add_flashcard(&note.title, &flashcard.question, &flashcard.answer, &tx)?;
    }
    let flashcards = get_flashcards_for_note(&note.title, &tx)?;

    tx.commit()?;
    Ok(Note {
        title: note.title.clone(),
        content: note.content.clone(),
        flashcards,
    })
}

/// Retrieves all note titles from database
pub fn get_all_notes(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT title FROM notes ORDER BY title")?;
    let notes = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(notes)
}

/// Loads all notes with their flashcards into memory
///
/// Review history is not kept here; it is fetched when a review session starts.
pub fn load_notebook(conn: &Connection) -> Result<Notebook> {
    let mut stmt = conn.prepare("SELECT title, content FROM notes ORDER BY title")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut notes = Vec::new();
    for (title, content) in rows {
        let flashcards = get_flashcards_for_note(&title, conn)?;
        notes.push(Note {
            title,
            content,
            flashcards,
        });
    }

    Ok(Notebook { notes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scheduler::select_due_items;
    use chrono::TimeZone;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = test_conn();
        set_current_date(day(1), &conn).unwrap();
        create_schema(&conn).unwrap();
        assert_eq!(get_current_date(&conn).unwrap(), day(1));
    }

    #[test]
    fn test_corrupt_current_date_is_an_error() {
        let conn = test_conn();
        conn.execute(
            "UPDATE app_state SET value = 'garbage' WHERE key = 'current_date'",
            [],
        )
        .unwrap();

        let result = get_current_date(&conn);
        assert!(matches!(result, Err(StudyError::InvalidDate(v)) if v == "garbage"));
        assert!(advance_day(&conn).is_err());
    }

    #[test]
    fn test_out_of_range_review_timestamp_is_an_error() {
        let conn = test_conn();
        new_note("Biology", "", &conn).unwrap();
        add_flashcard("Biology", "q1", "a1", &conn).unwrap();
        conn.execute(
            "UPDATE flashcards SET times_reviewed = 1, last_reviewed_at = ?1",
            params![i64::MAX],
        )
        .unwrap();

        assert!(matches!(
            load_reviewable_items("Biology", &conn),
            Err(StudyError::Database(_))
        ));
    }

    #[test]
    fn test_advance_day() {
        let conn = test_conn();
        set_current_date(day(1), &conn).unwrap();

        assert_eq!(advance_day(&conn).unwrap(), day(2));
        assert_eq!(get_current_date(&conn).unwrap(), day(2));
    }

    #[test]
    fn test_duplicate_note_is_rejected() {
        let conn = test_conn();
        new_note("Biology", "", &conn).unwrap();

        let result = new_note("Biology", "again", &conn);
        assert!(matches!(result, Err(StudyError::DuplicateNote(t)) if t == "Biology"));
    }

    #[test]
    fn test_add_flashcard_requires_note() {
        let conn = test_conn();
        let result = add_flashcard("Missing", "q", "a", &conn);
        assert!(matches!(result, Err(StudyError::NoteNotFound(_))));
    }

    #[test]
    fn test_add_flashcard_ignores_duplicate_question() {
        let conn = test_conn();
        new_note("Biology", "", &conn).unwrap();

        let first = add_flashcard("Biology", "What is ATP?", "Energy carrier", &conn).unwrap();
        let second = add_flashcard("Biology", "What is ATP?", "Something else", &conn).unwrap();

        assert_eq!(first, second);
        let cards = get_flashcards_for_note("Biology", &conn).unwrap();
        assert_eq!(cards, vec![Flashcard::new("What is ATP?", "Energy carrier")]);
    }

    #[test]
    fn test_new_flashcards_are_unreviewed_and_due() {
        let conn = test_conn();
        new_note("Biology", "", &conn).unwrap();
        add_flashcard("Biology", "q1", "a1", &conn).unwrap();
        add_flashcard("Biology", "q2", "a2", &conn).unwrap();

        let items = load_reviewable_items("Biology", &conn).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.times_reviewed == 0));
        assert!(items.iter().all(|i| i.last_reviewed_at.is_none()));
        assert!(items.iter().all(|i| i.last_outcome_correct.is_none()));

        let selection = select_due_items(&items, day(1));
        assert_eq!(selection.due, items);
    }

    #[test]
    fn test_record_review_persists_history() {
        let conn = test_conn();
        new_note("Biology", "", &conn).unwrap();
        let id = add_flashcard("Biology", "q1", "a1", &conn).unwrap();

        let updated = record_review(&id.to_string(), false, day(3), &conn).unwrap();
        assert_eq!(updated.times_reviewed, 1);

        let items = load_reviewable_items("Biology", &conn).unwrap();
        assert_eq!(items[0].times_reviewed, 1);
        assert_eq!(items[0].last_reviewed_at, Some(day(3)));
        assert_eq!(items[0].last_outcome_correct, Some(false));

        record_review(&id.to_string(), true, day(4), &conn).unwrap();
        let items = load_reviewable_items("Biology", &conn).unwrap();
        assert_eq!(items[0].times_reviewed, 2);
        assert_eq!(items[0].last_outcome_correct, Some(true));
    }

    #[test]
    fn test_record_review_unknown_id() {
        let conn = test_conn();
        assert!(matches!(
            record_review("42", true, day(1), &conn),
            Err(StudyError::FlashcardNotFound(_))
        ));
        assert!(matches!(
            record_review("not-a-number", true, day(1), &conn),
            Err(StudyError::FlashcardNotFound(_))
        ));
    }

    #[test]
    fn test_delete_note_cascades() {
        let conn = test_conn();
        new_note("Biology", "", &conn).unwrap();
        add_flashcard("Biology", "q1", "a1", &conn).unwrap();

        delete_note("Biology", &conn).unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(matches!(
            delete_note("Biology", &conn),
            Err(StudyError::NoteNotFound(_))
        ));
    }

    #[test]
    fn test_import_note_keeps_only_stored_cards() {
        let conn = test_conn();
        let note = Note {
            title: "Chemistry".to_string(),
            content: "Bonds".to_string(),
            flashcards: vec![
                Flashcard::new("What is a covalent bond?", "Shared electrons"),
                Flashcard::new("  ", "orphan answer"),
                Flashcard::new("What is a covalent bond?", "Something else"),
                Flashcard::new("What is an ionic bond?", "Transferred electrons"),
            ],
        };

        let stored = import_note(&note, &conn).unwrap();
        assert_eq!(
            stored.flashcards,
            vec![
                Flashcard::new("What is a covalent bond?", "Shared electrons"),
                Flashcard::new("What is an ionic bond?", "Transferred electrons"),
            ]
        );
        assert_eq!(load_notebook(&conn).unwrap().notes, vec![stored]);
    }

    #[test]
    fn test_failed_import_leaves_nothing_behind() {
        let conn = test_conn();
        conn.execute_batch(
            "CREATE TRIGGER reject_card BEFORE INSERT ON flashcards
             WHEN NEW.question = 'rejected'
             BEGIN SELECT RAISE(ABORT, 'rejected card'); END;",
        )
        .unwrap();
        let note = Note {
            title: "Chemistry".to_string(),
            content: String::new(),
            flashcards: vec![
                Flashcard::new("accepted", "a"),
                Flashcard::new("rejected", "b"),
            ],
        };

        assert!(matches!(
            import_note(&note, &conn),
            Err(StudyError::Database(_))
        ));
        assert!(get_all_notes(&conn).unwrap().is_empty());

        conn.execute_batch("DROP TRIGGER reject_card;").unwrap();
        let stored = import_note(&note, &conn).unwrap();
        assert_eq!(stored.flashcards.len(), 2);
    }

    #[test]
    fn test_load_notebook() {
        let conn = test_conn();
        new_note("History", "Dates", &conn).unwrap();
        new_note("Biology", "Cells", &conn).unwrap();
        add_flashcard("Biology", "q1", "a1", &conn).unwrap();

        let notebook = load_notebook(&conn).unwrap();
        assert_eq!(get_all_notes(&conn).unwrap(), vec!["Biology", "History"]);
        assert_eq!(notebook.notes.len(), 2);
        assert_eq!(notebook.notes[0].title, "Biology");
        assert_eq!(notebook.notes[0].content, "Cells");
        assert_eq!(notebook.notes[0].flashcards.len(), 1);
        assert!(notebook.notes[1].flashcards.is_empty());
    }
}
