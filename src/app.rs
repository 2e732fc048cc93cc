//! Main application UI and state management.
//! Handles note management, flashcard editing, retention overview and review sessions.

use chrono::{DateTime, Local, Utc};
use eframe::egui;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_assistant::database::db;
use study_assistant::export::json::{export_json_to_path, import_json};
use study_assistant::models::scheduler::{next_due_at, select_due_items};
use study_assistant::{
    Flashcard, Note, Notebook, Result, RetentionSummary, ReviewSession, ReviewableItem,
    StudyError,
};

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Review,
}

/// Main application state
pub struct MyApp {
    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    notebook: Notebook,
    selected_note_index: Option<usize>,
    current_question: String,
    current_answer: String,
    new_note_title: String,
    new_note_content: String,
    conn: Arc<Mutex<Connection>>,

    current_screen: AppScreen,
    review_session: Option<ReviewSession>,

    current_date: Option<DateTime<Utc>>,
    summaries: HashMap<String, RetentionSummary>,
    selected_items: Vec<ReviewableItem>,

    show_export_dialog: bool,
    show_message_dialog: bool,
    message: String,
}

/// Formats a timestamp as a local YYYY-MM-DD string
fn format_date(time: DateTime<Utc>) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d").to_string()
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Review => self.render_review_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if self.show_export_dialog {
            let mut export_note_index: Option<usize> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Note")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a note to export:");
                    ui.separator();

                    for (i, note) in self.notebook.notes.iter().enumerate() {
                        if ui
                            .button(format!("{} ({} cards)", note.title, note.flashcards.len()))
                            .clicked()
                        {
                            export_note_index = Some(i);
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(i) = export_note_index {
                self.handle_export(i);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if self.show_message_dialog {
            egui::Window::new("Study Assistant")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_message_dialog = false;
                    }
                });
        }
    }
}

impl MyApp {
    /// Creates a new application instance with notes loaded from database
    pub fn new_with_notebook(notebook: Notebook, conn: Connection) -> Self {
        let has_notes = !notebook.notes.is_empty();
        let mut app = Self {
            show_confirmation_dialog: false,
            allowed_to_close: false,
            notebook,
            selected_note_index: if has_notes { Some(0) } else { None },
            current_question: String::new(),
            current_answer: String::new(),
            new_note_title: String::new(),
            new_note_content: String::new(),
            conn: Arc::new(Mutex::new(conn)),
            current_screen: AppScreen::Main,
            review_session: None,
            current_date: None,
            summaries: HashMap::new(),
            selected_items: Vec::new(),
            show_export_dialog: false,
            show_message_dialog: false,
            message: String::new(),
        };
        app.refresh();
        app
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().map_err(|_| StudyError::LockPoisoned)?;
        f(&guard)
    }

    fn show_message(&mut self, message: String) {
        self.message = message;
        self.show_message_dialog = true;
    }

    /// Reloads the current date, per-note retention summaries and the selected note's items
    fn refresh(&mut self) {
        let titles: Vec<String> = self.notebook.notes.iter().map(|n| n.title.clone()).collect();
        let selected = self
            .selected_note_index
            .and_then(|i| self.notebook.notes.get(i))
            .map(|n| n.title.clone());

        let loaded = self.with_conn(|conn| {
            let now = db::get_current_date(conn)?;
            let mut summaries = HashMap::new();
            let mut selected_items = Vec::new();
            for title in &titles {
                let items = db::load_reviewable_items(title, conn)?;
                summaries.insert(title.clone(), RetentionSummary::from_items(&items, now));
                if selected.as_ref() == Some(title) {
                    selected_items = items;
                }
            }
            Ok((now, summaries, selected_items))
        });

        match loaded {
            Ok((now, summaries, selected_items)) => {
                self.current_date = Some(now);
                self.summaries = summaries;
                self.selected_items = selected_items;
            }
            Err(e) => {
                log::warn!("Failed to refresh review state: {}", e);
                self.show_message(format!("Failed to load review state: {}", e));
            }
        }
    }

    /// Renders the main screen with note management interface
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                let date = self
                    .current_date
                    .map(format_date)
                    .unwrap_or_else(|| "Unknown".to_string());
                ui.label(format!("Today: {}", date));

                if ui.button("Next Day").clicked() {
                    match self.with_conn(db::advance_day) {
                        Ok(_) => self.refresh(),
                        Err(e) => self.show_message(format!("Could not advance day: {}", e)),
                    }
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Export Note").clicked() {
                    self.show_export_dialog = true;
                }
                if ui.button("Import Note").clicked() {
                    self.handle_import();
                }
            });

            ui.separator();

            ui.heading("Create New Note");
            ui.horizontal(|ui| {
                ui.label("Title:");
                ui.text_edit_singleline(&mut self.new_note_title);
            });
            ui.label("Notes:");
            ui.add(
                egui::TextEdit::multiline(&mut self.new_note_content)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            if ui.button("Create Note").clicked() {
                self.handle_create_note();
            }

            ui.separator();

            ui.heading(format!("Notes ({})", self.notebook.notes.len()));

            // Actions run after rendering to avoid borrowing conflicts
            let mut action_select: Option<usize> = None;
            let mut action_review: Option<usize> = None;
            let mut action_delete: Option<usize> = None;

            egui::ScrollArea::vertical()
                .id_salt("notes_list")
                .max_height(160.0)
                .show(ui, |ui| {
                    for (i, note) in self.notebook.notes.iter().enumerate() {
                        let is_selected = self.selected_note_index == Some(i);
                        let summary = self.summaries.get(&note.title).copied().unwrap_or_default();

                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(
                                    is_selected,
                                    format!("{}. {} ({})", i + 1, note.title, summary.describe()),
                                )
                                .clicked()
                            {
                                action_select = Some(i);
                            }

                            if ui
                                .add_enabled(summary.due > 0, egui::Button::new("Review"))
                                .clicked()
                            {
                                action_review = Some(i);
                            }

                            if ui.button("Delete").clicked() {
                                action_delete = Some(i);
                            }
                        });
                    }
                });

            if let Some(i) = action_select {
                self.selected_note_index = Some(i);
                self.refresh();
            }
            if let Some(i) = action_review {
                self.start_review_session(i);
            }
            if let Some(i) = action_delete {
                self.handle_delete(i);
            }

            ui.separator();

            self.render_selected_note(ui);
        });
    }

    /// Flashcard editing and weak-item overview for the selected note
    fn render_selected_note(&mut self, ui: &mut egui::Ui) {
        let Some(note_index) = self.selected_note_index else {
            ui.label("Select a note to add flashcards");
            return;
        };
        let Some(note) = self.notebook.notes.get(note_index) else {
            return;
        };
        let title = note.title.clone();

        ui.heading(format!("Selected Note: {}", title));
        if !note.content.is_empty() {
            ui.label(&note.content);
        }

        ui.horizontal(|ui| {
            ui.label("Question:");
            ui.text_edit_singleline(&mut self.current_question);
        });
        ui.horizontal(|ui| {
            ui.label("Answer:");
            ui.text_edit_singleline(&mut self.current_answer);
        });
        if ui.button("Add Flashcard").clicked() {
            self.handle_add_flashcard(note_index);
        }

        ui.separator();

        let weak = self
            .current_date
            .map(|now| select_due_items(&self.selected_items, now).weak)
            .unwrap_or_default();
        if !weak.is_empty() {
            ui.colored_label(
                egui::Color32::from_rgb(200, 80, 60),
                format!("Needs attention ({})", weak.len()),
            );
            for item in &weak {
                ui.label(format!("  • {}", item.prompt_text));
            }
            ui.separator();
        }

        let Some(note) = self.notebook.notes.get(note_index) else {
            return;
        };
        ui.heading(format!("Flashcards ({})", note.flashcards.len()));

        egui::ScrollArea::vertical()
            .id_salt("flashcards_list")
            .max_height(200.0)
            .show(ui, |ui| {
                for (i, flashcard) in note.flashcards.iter().enumerate() {
                    let history = self
                        .selected_items
                        .iter()
                        .find(|item| item.prompt_text == flashcard.question);
                    ui.group(|ui| {
                        ui.label(format!("{}. Q: {}", i + 1, flashcard.question));
                        ui.label(format!("   A: {}", flashcard.answer));
                        if let Some(item) = history {
                            let next = next_due_at(item)
                                .map(format_date)
                                .unwrap_or_else(|| "now".to_string());
                            ui.label(format!(
                                "   Reviewed {} times, next review: {}",
                                item.review_count(),
                                next
                            ));
                        }
                    });
                }
            });
    }

    /// Renders the review screen with the flashcard question/answer interface
    fn render_review_screen(&mut self, ctx: &egui::Context) {
        let mut action_back = false;
        let mut grade_error: Option<StudyError> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &mut self.review_session else {
                action_back = true;
                return;
            };

            ui.heading(format!("Reviewing: {}", session.note_title));
            ui.label(session.phase_message());
            ui.label(format!(
                "Progress: {} / {} correct ({} remaining)",
                session.passed_count(),
                session.total_count(),
                session.remaining_count()
            ));

            ui.add_space(20.0);

            if session.is_completed() {
                ui.heading("Well done!");
                ui.label("Every due card in this note has been answered correctly.");
                ui.add_space(20.0);
                if ui.button("Back to Main Screen").clicked() {
                    action_back = true;
                }
                return;
            }

            let Some(card) = session.current_card() else {
                return;
            };
            // Clone values to avoid borrowing issues
            let show_answer = session.show_answer;
            let is_weak = card.is_weak;
            let question = card.flashcard.question.clone();
            let answer = card.flashcard.answer.clone();

            ui.group(|ui| {
                ui.set_min_height(200.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    if is_weak {
                        ui.colored_label(
                            egui::Color32::from_rgb(200, 80, 60),
                            "Missed last time",
                        );
                    }

                    ui.heading("Question:");
                    ui.label(&question);

                    ui.add_space(20.0);

                    if show_answer {
                        ui.heading("Answer:");
                        ui.label(&answer);
                    } else {
                        ui.label("(Click 'Show Answer' to reveal)");
                    }

                    ui.add_space(20.0);
                });
            });

            ui.add_space(20.0);

            let mut action_toggle = false;
            let mut action_grade: Option<bool> = None;

            if show_answer {
                ui.label("Did you know it?");
                ui.horizontal(|ui| {
                    if ui.button("Wrong").clicked() {
                        action_grade = Some(false);
                    }
                    if ui.button("Correct").clicked() {
                        action_grade = Some(true);
                    }
                });
            } else if ui.button("Show Answer").clicked() {
                action_toggle = true;
            }

            ui.add_space(20.0);

            if ui.button("Back to Main Screen").clicked() {
                action_back = true;
            }

            if action_toggle {
                session.toggle_answer();
            }
            if let Some(correct) = action_grade {
                match session.grade_current_card(correct) {
                    Ok(()) => session.next_card(),
                    Err(e) => grade_error = Some(e),
                }
            }
        });

        if let Some(e) = grade_error {
            log::warn!("Failed to record review: {}", e);
            self.show_message(format!("Failed to record review: {}", e));
        }
        if action_back {
            self.current_screen = AppScreen::Main;
            self.review_session = None;
            self.refresh();
        }
    }

    /// Starts a review session with the note's cards that are due today
    fn start_review_session(&mut self, note_index: usize) {
        let Some(title) = self.notebook.notes.get(note_index).map(|n| n.title.clone()) else {
            return;
        };

        match ReviewSession::start(&title, Arc::clone(&self.conn)) {
            Ok(session) if session.total_count() > 0 => {
                self.review_session = Some(session);
                self.current_screen = AppScreen::Review;
            }
            Ok(_) => self.show_message(format!("Nothing in '{}' is due today.", title)),
            Err(e) => self.show_message(format!("Could not start review: {}", e)),
        }
    }

    fn handle_create_note(&mut self) {
        let title = self.new_note_title.trim().to_string();
        if title.is_empty() {
            return;
        }
        let content = self.new_note_content.trim().to_string();

        match self.with_conn(|conn| db::new_note(&title, &content, conn)) {
            Ok(()) => {
                self.notebook.notes.push(Note {
                    title,
                    content,
                    flashcards: Vec::new(),
                });
                self.selected_note_index = Some(self.notebook.notes.len() - 1);
                self.new_note_title.clear();
                self.new_note_content.clear();
                self.refresh();
            }
            Err(e) => self.show_message(format!("Could not create note: {}", e)),
        }
    }

    fn handle_add_flashcard(&mut self, note_index: usize) {
        let flashcard = Flashcard::new(
            self.current_question.trim(),
            self.current_answer.trim(),
        );
        if !flashcard.is_complete() {
            return;
        }
        let Some(title) = self.notebook.notes.get(note_index).map(|n| n.title.clone()) else {
            return;
        };

        let saved = self.with_conn(|conn| {
            db::add_flashcard(&title, &flashcard.question, &flashcard.answer, conn)
        });
        match saved {
            Ok(_) => {
                if let Some(note) = self.notebook.notes.get_mut(note_index) {
                    if !note.flashcards.iter().any(|f| f.question == flashcard.question) {
                        note.flashcards.push(flashcard);
                    }
                }
                self.current_question.clear();
                self.current_answer.clear();
                self.refresh();
            }
            Err(e) => self.show_message(format!("Could not add flashcard: {}", e)),
        }
    }

    fn handle_delete(&mut self, note_index: usize) {
        let Some(title) = self.notebook.notes.get(note_index).map(|n| n.title.clone()) else {
            return;
        };

        match self.with_conn(|conn| db::delete_note(&title, conn)) {
            Ok(()) => {
                self.notebook.remove(&title);
                self.selected_note_index = if self.notebook.notes.is_empty() {
                    None
                } else {
                    Some(0)
                };
                self.refresh();
            }
            Err(e) => self.show_message(format!("Could not delete note: {}", e)),
        }
    }

    /// Handles note export to JSON file
    fn handle_export(&mut self, note_index: usize) {
        self.show_export_dialog = false;
        let Some(note) = self.notebook.notes.get(note_index) else {
            return;
        };

        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{}.json", note.title))
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            let message = match export_json_to_path(note, &path) {
                Ok(()) => format!("Note '{}' exported successfully!", note.title),
                Err(e) => format!("Export failed: {}", e),
            };
            self.show_message(message);
        }
    }

    /// Handles note import from JSON file
    fn handle_import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        let note = match import_json(&path) {
            Ok(note) => note,
            Err(e) => {
                self.show_message(format!(
                    "Import failed: {}\n\nPlease check if the file has correct structure:\n{{\n  \"title\": \"Note Title\",\n  \"content\": \"...\",\n  \"flashcards\": [...]\n}}",
                    e
                ));
                return;
            }
        };

        if self.notebook.contains(&note.title) {
            self.show_message(format!(
                "Note '{}' already exists! Please rename it in the JSON file.",
                note.title
            ));
            return;
        }

        let stored = match self.with_conn(|conn| db::import_note(&note, conn)) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Import of '{}' rolled back: {}", note.title, e);
                self.show_message(format!("Failed to import note '{}': {}", note.title, e));
                return;
            }
        };

        let message = format!(
            "Note '{}' imported successfully with {} cards!",
            stored.title,
            stored.flashcards.len()
        );
        self.notebook.notes.push(stored);
        self.refresh();
        self.show_message(message);
    }
}
