//! Application configuration
//!
//! Read from an optional TOML file, then overridden by environment variables:
//! - STUDY_ASSISTANT_DB: database file path
//! - STUDY_ASSISTANT_LOG: default log filter (RUST_LOG still wins)

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "study_assistant.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    pub window_width: f32,
    pub window_height: f32,
    /// Filter passed to env_logger when RUST_LOG is unset
    pub log_level: String,
    /// Create a sample note on first start when the database is empty
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("study_assistant.sqlite3"),
            window_width: 520.0,
            window_height: 760.0,
            log_level: "info".to_string(),
            seed_sample_data: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads the file if it exists, falls back to defaults otherwise, then applies env overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with overrides read through `lookup`.
    pub fn load_with<P: AsRef<Path>>(
        path: P,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("STUDY_ASSISTANT_DB").filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(level) = lookup("STUDY_ASSISTANT_LOG").filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }
}
