//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so test code never carries
//! its own copy of the tables.

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use tempfile::TempDir;

use crate::domain::{Difficulty, Question, Quiz};

/// Reference instant for deterministic timestamps in tests
pub const BASE_TIME: &str = "2026-03-02T08:00:00Z";

/// `BASE_TIME` shifted by a number of hours
pub fn at(hours: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(BASE_TIME)
        .expect("BASE_TIME is valid RFC 3339")
        .with_timezone(&Utc)
        + Duration::hours(hours)
}

/// Quiz whose i-th question has correct answer `key[i]`
pub fn sample_quiz(user_id: i64, document_id: i64, key: &[u8]) -> Quiz {
    let questions = key
        .iter()
        .enumerate()
        .map(|(i, &correct)| Question {
            question: format!("Question {}", i + 1),
            options: ["alpha".into(), "beta".into(), "gamma".into(), "delta".into()],
            correct_answer: correct,
            explanation: format!("The answer is option {}", correct),
            difficulty: Difficulty::Medium,
        })
        .collect();
    Quiz::new(
        user_id,
        document_id,
        "Sample Notes - Quiz".to_string(),
        questions,
        Difficulty::Medium,
        at(0),
    )
}

/// Migrated database in a temporary directory, removed on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let conn = Connection::open(temp.path().join("studydeck.db"))?;
        crate::db::schema::run_migrations(&conn)?;
        Ok(Self { temp, conn })
    }
}
