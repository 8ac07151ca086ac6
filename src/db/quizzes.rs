//! Quiz records. Quizzes are immutable once stored; deleting one removes its attempts.

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{db_time, from_json, parse_db_time, to_json};
use crate::domain::{Difficulty, Question, Quiz};

pub fn insert_quiz(conn: &Connection, quiz: &Quiz) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        r#"
    INSERT INTO quizzes (user_id, document_id, title, difficulty, time_limit, category, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            quiz.user_id,
            quiz.document_id,
            quiz.title,
            quiz.difficulty.as_str(),
            quiz.time_limit,
            quiz.category,
            db_time(&quiz.created_at),
        ],
    )?;
    let quiz_id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            r#"
      INSERT INTO quiz_questions (quiz_id, position, question, options, correct_answer, explanation, difficulty)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
      "#,
        )?;
        for (position, q) in quiz.questions.iter().enumerate() {
            stmt.execute(params![
                quiz_id,
                position as i64,
                q.question,
                to_json(&q.options)?,
                q.correct_answer,
                q.explanation,
                q.difficulty.as_str(),
            ])?;
        }
    }

    tx.commit()?;
    Ok(quiz_id)
}

/// Fetch a quiz with its questions in order, scoped to its owner
pub fn get_quiz(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Quiz>> {
    let quiz = conn
        .query_row(
            r#"
      SELECT id, user_id, document_id, title, difficulty, time_limit, category, created_at
      FROM quizzes WHERE id = ?1 AND user_id = ?2
      "#,
            params![id, user_id],
            row_to_quiz,
        )
        .optional()?;

    match quiz {
        Some(mut quiz) => {
            quiz.questions = get_questions(conn, quiz.id)?;
            Ok(Some(quiz))
        }
        None => Ok(None),
    }
}

/// A user's quizzes, newest first, optionally only those built from one document
pub fn list_quizzes(conn: &Connection, user_id: i64, document_id: Option<i64>) -> Result<Vec<Quiz>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, document_id, title, difficulty, time_limit, category, created_at
    FROM quizzes
    WHERE user_id = ?1 AND (?2 IS NULL OR document_id = ?2)
    ORDER BY created_at DESC, id DESC
    "#,
    )?;
    let mut quizzes = stmt
        .query_map(params![user_id, document_id], row_to_quiz)?
        .collect::<Result<Vec<_>>>()?;

    for quiz in &mut quizzes {
        quiz.questions = get_questions(conn, quiz.id)?;
    }
    Ok(quizzes)
}

/// Delete a quiz, its questions and every attempt at it.
/// Returns false when nothing matched the id and owner.
pub fn delete_quiz(conn: &Connection, user_id: i64, id: i64) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let deleted = tx.execute(
        "DELETE FROM quizzes WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if deleted == 0 {
        return Ok(false);
    }
    tx.execute("DELETE FROM quiz_questions WHERE quiz_id = ?1", params![id])?;
    let attempts = tx.execute("DELETE FROM quiz_attempts WHERE quiz_id = ?1", params![id])?;
    tx.commit()?;

    tracing::debug!(quiz_id = id, attempts, "Deleted quiz with its attempts");
    Ok(true)
}

fn get_questions(conn: &Connection, quiz_id: i64) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT question, options, correct_answer, explanation, difficulty
    FROM quiz_questions
    WHERE quiz_id = ?1
    ORDER BY position ASC
    "#,
    )?;
    let questions = stmt
        .query_map(params![quiz_id], |row| {
            let options: String = row.get(1)?;
            let difficulty: String = row.get(4)?;
            Ok(Question {
                question: row.get(0)?,
                options: from_json(1, &options)?,
                correct_answer: row.get(2)?,
                explanation: row.get(3)?,
                difficulty: parse_difficulty(4, &difficulty)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(questions)
}

fn parse_difficulty(idx: usize, s: &str) -> Result<Difficulty> {
    Difficulty::from_str(s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, format!("unknown difficulty '{}'", s).into())
    })
}

fn row_to_quiz(row: &rusqlite::Row) -> Result<Quiz> {
    let difficulty: String = row.get(4)?;
    let created_at: String = row.get(7)?;

    Ok(Quiz {
        id: row.get(0)?,
        user_id: row.get(1)?,
        document_id: row.get(2)?,
        title: row.get(3)?,
        questions: Vec::new(),
        difficulty: parse_difficulty(4, &difficulty)?,
        time_limit: row.get(5)?,
        category: row.get(6)?,
        created_at: parse_db_time(7, &created_at)?,
    })
}
