mod app;
use study_assistant::*;

use app::MyApp;
use config::DEFAULT_CONFIG_PATH;
use database::db::{add_flashcard, get_all_notes, init_database, load_notebook, new_note};

fn seed_sample_note(conn: &rusqlite::Connection) -> Result<()> {
    new_note(
        "Polish Vocabulary",
        "Everyday greetings and courtesy words.",
        conn,
    )?;
    add_flashcard("Polish Vocabulary", "cześć", "hello", conn)?;
    add_flashcard("Polish Vocabulary", "dziękuję", "thank you", conn)?;
    add_flashcard("Polish Vocabulary", "proszę", "please", conn)?;
    Ok(())
}

fn main() -> eframe::Result<()> {
    let config = AppConfig::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
        eprintln!("Ignoring {}: {}", DEFAULT_CONFIG_PATH, e);
        AppConfig::default()
    });

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let conn = init_database(&config.database_path).expect("Failed to initialize database");

    if config.seed_sample_data && get_all_notes(&conn).unwrap_or_default().is_empty() {
        match seed_sample_note(&conn) {
            Ok(()) => log::info!("Sample note created"),
            Err(e) => log::warn!("Could not create sample note: {}", e),
        }
    }

    let notebook = load_notebook(&conn).expect("Failed to load notes from database");

    log::info!("Loaded {} notes from database", notebook.notes.len());
    for note in &notebook.notes {
        log::debug!("  - {} ({} cards)", note.title, note.flashcards.len());
    }
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };
    eframe::run_native(
        "Study Assistant",
        options,
        Box::new(|_cc| Ok(Box::new(MyApp::new_with_notebook(notebook, conn)))),
    )
}
