//! Application configuration.
//!
//! The database location is layered (config.toml, then environment, then a
//! default); everything else is a tunable constant kept in one place.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

/// Default database location when nothing else is configured
pub const DEFAULT_DATABASE_PATH: &str = "data/studydeck.db";

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    let _ = dotenvy::dotenv();

    if let Some(path) = database_path_from_file(Path::new("config.toml")) {
        tracing::info!("Using database from config.toml: {}", path.display());
        return path;
    }

    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    let default = PathBuf::from(DEFAULT_DATABASE_PATH);
    tracing::info!("Using default database path: {}", default.display());
    default
}

/// Read `[database] path` from a TOML file, if the file and key exist
fn database_path_from_file(file: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(file).ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => config.database.and_then(|db| db.path).map(PathBuf::from),
        Err(e) => {
            tracing::warn!("Ignoring unreadable {}: {}", file.display(), e);
            None
        }
    }
}

// ==================== Review Scheduling ====================

/// Days added per lifetime correct review
pub const CORRECT_INTERVAL_STEP_DAYS: i64 = 2;

/// Ceiling on the review interval
pub const MAX_INTERVAL_DAYS: i64 = 30;

/// A missed card comes back the next day
pub const MISSED_INTERVAL_DAYS: i64 = 1;

// ==================== Content Generation ====================

/// Every generated question has exactly this many options
pub const QUESTION_OPTION_COUNT: usize = 4;

pub const DEFAULT_FLASHCARD_COUNT: u32 = 10;
pub const DEFAULT_QUESTION_COUNT: u32 = 5;

/// Quiz time limit in minutes
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 30;

pub const DEFAULT_CATEGORY: &str = "General";

pub const GENERATOR_MODEL: &str = "llama-3.1-8b-instant";
pub const GENERATOR_TEMPERATURE: f32 = 0.7;
pub const FLASHCARD_MAX_TOKENS: u32 = 2000;
pub const QUIZ_MAX_TOKENS: u32 = 3000;

/// Only this many characters of a document are sent to the generator
pub const DOCUMENT_EXCERPT_CHARS: usize = 6000;

// ==================== Query Limits ====================

/// Limit for the "all attempts" history
pub const ATTEMPT_HISTORY_LIMIT: usize = 50;

/// Limit for recent activity on the dashboard
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Default limit for due flashcard queries
pub const DEFAULT_DUE_LIMIT: usize = 50;

// ==================== Progress ====================

/// Window for "study days this month"
pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

pub const DEFAULT_ANALYTICS_PERIOD_DAYS: i64 = 30;

pub const WEEKLY_QUIZ_TARGET: i64 = 5;
pub const WEEKLY_FLASHCARD_TARGET: i64 = 20;
