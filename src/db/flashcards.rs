//! Flashcard records and review persistence

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{db_time, from_json, parse_db_time, to_json};
use crate::domain::{Difficulty, Flashcard};

const FLASHCARD_COLUMNS: &str = "id, user_id, document_id, question, answer, difficulty, category, \
     is_favorite, tags, review_count, correct_count, last_reviewed, next_review, created_at, updated_at";

/// Query options for listing a user's flashcards
#[derive(Debug, Clone, Default)]
pub struct FlashcardFilter {
    /// Only cards generated from this document
    pub document_id: Option<i64>,
    pub favorites_only: bool,
    pub difficulty: Option<Difficulty>,
}

pub fn insert_flashcard(conn: &Connection, card: &Flashcard) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO flashcards (user_id, document_id, question, answer, difficulty, category, is_favorite,
                            tags, review_count, correct_count, last_reviewed, next_review,
                            created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
    "#,
        params![
            card.user_id,
            card.document_id,
            card.question,
            card.answer,
            card.difficulty.as_str(),
            card.category,
            card.is_favorite,
            to_json(&card.tags)?,
            card.review_count,
            card.correct_count,
            card.last_reviewed.as_ref().map(db_time),
            db_time(&card.next_review),
            db_time(&card.created_at),
            db_time(&card.updated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a generated batch; either every card is stored or none is.
pub fn insert_flashcards(conn: &Connection, cards: &[Flashcard]) -> Result<Vec<i64>> {
    let tx = conn.unchecked_transaction()?;
    let ids = cards
        .iter()
        .map(|card| insert_flashcard(&tx, card))
        .collect::<Result<Vec<_>>>()?;
    tx.commit()?;
    Ok(ids)
}

/// Fetch a card by id, scoped to its owner
pub fn get_flashcard(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Flashcard>> {
    let query = format!(
        "SELECT {} FROM flashcards WHERE id = ?1 AND user_id = ?2",
        FLASHCARD_COLUMNS
    );
    conn.query_row(&query, params![id, user_id], row_to_flashcard)
        .optional()
}

/// A user's cards, newest first
pub fn list_flashcards(conn: &Connection, user_id: i64, filter: &FlashcardFilter) -> Result<Vec<Flashcard>> {
    let query = format!(
        r#"
    SELECT {}
    FROM flashcards
    WHERE user_id = ?1
      AND (?2 IS NULL OR document_id = ?2)
      AND (?3 = 0 OR is_favorite = 1)
      AND (?4 IS NULL OR difficulty = ?4)
    ORDER BY created_at DESC, id DESC
    "#,
        FLASHCARD_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let cards = stmt
        .query_map(
            params![
                user_id,
                filter.document_id,
                filter.favorites_only,
                filter.difficulty.map(|d| d.as_str()),
            ],
            row_to_flashcard,
        )?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

/// Cards whose next review is at or before `now`, most overdue first
pub fn get_due_flashcards(
    conn: &Connection,
    user_id: i64,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Flashcard>> {
    let query = format!(
        r#"
    SELECT {}
    FROM flashcards
    WHERE user_id = ?1 AND next_review <= ?2
    ORDER BY next_review ASC, id ASC
    LIMIT ?3
    "#,
        FLASHCARD_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let cards = stmt
        .query_map(params![user_id, db_time(&now), limit as i64], row_to_flashcard)?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

pub fn get_due_count(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1 AND next_review <= ?2",
        params![user_id, db_time(&now)],
        |row| row.get(0),
    )
}

/// Returns false when no card matched the id and owner
pub fn set_favorite(
    conn: &Connection,
    user_id: i64,
    id: i64,
    is_favorite: bool,
    now: DateTime<Utc>,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE flashcards SET is_favorite = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
        params![is_favorite, db_time(&now), id, user_id],
    )?;
    Ok(updated > 0)
}

/// Persist a reviewed card and log the review in one transaction.
///
/// `card` is the record returned by the scheduler. Returns false when the card
/// no longer exists for this owner.
pub fn apply_review(conn: &Connection, card: &Flashcard, was_correct: bool) -> Result<bool> {
    let reviewed_at = card.last_reviewed.unwrap_or(card.updated_at);

    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        r#"
    UPDATE flashcards
    SET review_count = ?1, correct_count = ?2, last_reviewed = ?3, next_review = ?4, updated_at = ?5
    WHERE id = ?6 AND user_id = ?7
    "#,
        params![
            card.review_count,
            card.correct_count,
            db_time(&reviewed_at),
            db_time(&card.next_review),
            db_time(&card.updated_at),
            card.id,
            card.user_id,
        ],
    )?;
    if updated == 0 {
        return Ok(false);
    }

    tx.execute(
        "INSERT INTO review_logs (flashcard_id, user_id, is_correct, reviewed_at) VALUES (?1, ?2, ?3, ?4)",
        params![card.id, card.user_id, was_correct, db_time(&reviewed_at)],
    )?;
    tx.commit()?;
    Ok(true)
}

/// Delete a card and its review log. Returns false when nothing matched.
pub fn delete_flashcard(conn: &Connection, user_id: i64, id: i64) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let deleted = tx.execute(
        "DELETE FROM flashcards WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if deleted == 0 {
        return Ok(false);
    }
    tx.execute("DELETE FROM review_logs WHERE flashcard_id = ?1", params![id])?;
    tx.commit()?;
    Ok(true)
}

fn row_to_flashcard(row: &rusqlite::Row) -> Result<Flashcard> {
    let difficulty_str: String = row.get(5)?;
    let difficulty = Difficulty::from_str(&difficulty_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown difficulty '{}'", difficulty_str).into(),
        )
    })?;
    let tags: String = row.get(8)?;
    let last_reviewed: Option<String> = row.get(11)?;
    let next_review: String = row.get(12)?;
    let created_at: String = row.get(13)?;
    let updated_at: String = row.get(14)?;

    Ok(Flashcard {
        id: row.get(0)?,
        user_id: row.get(1)?,
        document_id: row.get(2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        difficulty,
        category: row.get(6)?,
        is_favorite: row.get(7)?,
        tags: from_json(8, &tags)?,
        review_count: row.get(9)?,
        correct_count: row.get(10)?,
        last_reviewed: last_reviewed.map(|s| parse_db_time(11, &s)).transpose()?,
        next_review: parse_db_time(12, &next_review)?,
        created_at: parse_db_time(13, &created_at)?,
        updated_at: parse_db_time(14, &updated_at)?,
    })
}
