//! Quiz attempt records

use rusqlite::{params, Connection, Result};
use serde::Serialize;

use super::{db_time, from_json, parse_db_time, to_json};
use crate::domain::QuizAttempt;

const ATTEMPT_COLUMNS: &str = "a.id, a.quiz_id, a.user_id, a.answers, a.score, a.total_questions, \
     a.correct_answers, a.time_spent, a.completed_at";

/// Attempt listed together with the title of its quiz
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptWithQuiz {
    #[serde(flatten)]
    pub attempt: QuizAttempt,
    pub quiz_title: String,
}

pub fn insert_attempt(conn: &Connection, attempt: &QuizAttempt) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO quiz_attempts (quiz_id, user_id, answers, score, total_questions, correct_answers,
                               time_spent, completed_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
        params![
            attempt.quiz_id,
            attempt.user_id,
            to_json(&attempt.answers)?,
            attempt.score,
            attempt.total_questions,
            attempt.correct_answers,
            attempt.time_spent,
            db_time(&attempt.completed_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Attempts at one quiz by one user, newest first
pub fn list_attempts_for_quiz(conn: &Connection, user_id: i64, quiz_id: i64) -> Result<Vec<QuizAttempt>> {
    let query = format!(
        r#"
    SELECT {}
    FROM quiz_attempts a
    WHERE a.user_id = ?1 AND a.quiz_id = ?2
    ORDER BY a.completed_at DESC, a.id DESC
    "#,
        ATTEMPT_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let attempts = stmt
        .query_map(params![user_id, quiz_id], row_to_attempt)?
        .collect::<Result<Vec<_>>>()?;
    Ok(attempts)
}

/// A user's most recent attempts across all quizzes
pub fn list_recent_attempts(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<AttemptWithQuiz>> {
    let query = format!(
        r#"
    SELECT {}, q.title
    FROM quiz_attempts a
    JOIN quizzes q ON q.id = a.quiz_id
    WHERE a.user_id = ?1
    ORDER BY a.completed_at DESC, a.id DESC
    LIMIT ?2
    "#,
        ATTEMPT_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let attempts = stmt
        .query_map(params![user_id, limit as i64], |row| {
            Ok(AttemptWithQuiz {
                attempt: row_to_attempt(row)?,
                quiz_title: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(attempts)
}

fn row_to_attempt(row: &rusqlite::Row) -> Result<QuizAttempt> {
    let answers: String = row.get(3)?;
    let completed_at: String = row.get(8)?;

    Ok(QuizAttempt {
        id: row.get(0)?,
        quiz_id: row.get(1)?,
        user_id: row.get(2)?,
        answers: from_json(3, &answers)?,
        score: row.get(4)?,
        total_questions: row.get(5)?,
        correct_answers: row.get(6)?,
        time_spent: row.get(7)?,
        completed_at: parse_db_time(8, &completed_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{delete_quiz, insert_quiz};
    use crate::grading::grade;
    use crate::testing::{at, sample_quiz, TestEnv};

    fn stored_quiz(env: &TestEnv, user_id: i64, key: &[u8]) -> crate::domain::Quiz {
        let mut quiz = sample_quiz(user_id, 1, key);
        quiz.id = insert_quiz(&env.conn, &quiz).unwrap();
        quiz
    }

    #[test]
    fn test_insert_and_list_roundtrip() {
        let env = TestEnv::new().unwrap();
        let quiz = stored_quiz(&env, 1, &[0, 1, 2]);
        let mut attempt = grade(&quiz, &[Some(0), None, Some(3)], 75, at(1)).unwrap().attempt;

        attempt.id = insert_attempt(&env.conn, &attempt).unwrap();
        let listed = list_attempts_for_quiz(&env.conn, 1, quiz.id).unwrap();

        assert_eq!(listed, vec![attempt]);
    }

    #[test]
    fn test_list_for_quiz_newest_first_and_scoped() {
        let env = TestEnv::new().unwrap();
        let quiz = stored_quiz(&env, 1, &[0]);
        let early = grade(&quiz, &[Some(0)], 10, at(1)).unwrap().attempt;
        let late = grade(&quiz, &[Some(1)], 10, at(2)).unwrap().attempt;
        insert_attempt(&env.conn, &early).unwrap();
        insert_attempt(&env.conn, &late).unwrap();

        let listed = list_attempts_for_quiz(&env.conn, 1, quiz.id).unwrap();
        let scores: Vec<i64> = listed.iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![0, 100]);
        assert!(list_attempts_for_quiz(&env.conn, 2, quiz.id).unwrap().is_empty());
    }

    #[test]
    fn test_recent_attempts_include_title_and_limit() {
        let env = TestEnv::new().unwrap();
        let quiz = stored_quiz(&env, 1, &[2]);
        for i in 0..4 {
            let attempt = grade(&quiz, &[Some(2)], 10, at(i)).unwrap().attempt;
            insert_attempt(&env.conn, &attempt).unwrap();
        }

        let recent = list_recent_attempts(&env.conn, 1, 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].quiz_title, quiz.title);
        assert_eq!(recent[0].attempt.completed_at, at(3));
    }

    #[test]
    fn test_quiz_delete_cascades_to_attempts() {
        let env = TestEnv::new().unwrap();
        let quiz = stored_quiz(&env, 1, &[0, 1]);
        let kept = stored_quiz(&env, 1, &[0]);
        insert_attempt(&env.conn, &grade(&quiz, &[Some(0), Some(1)], 5, at(1)).unwrap().attempt).unwrap();
        insert_attempt(&env.conn, &grade(&kept, &[Some(0)], 5, at(1)).unwrap().attempt).unwrap();

        assert!(delete_quiz(&env.conn, 1, quiz.id).unwrap());
        assert!(list_attempts_for_quiz(&env.conn, 1, quiz.id).unwrap().is_empty());
        assert_eq!(list_attempts_for_quiz(&env.conn, 1, kept.id).unwrap().len(), 1);
    }

    #[test]
    fn test_attempt_with_quiz_serializes_flat() {
        let env = TestEnv::new().unwrap();
        let quiz = stored_quiz(&env, 1, &[0]);
        insert_attempt(&env.conn, &grade(&quiz, &[Some(0)], 5, at(1)).unwrap().attempt).unwrap();

        let recent = list_recent_attempts(&env.conn, 1, 10).unwrap();
        let json = serde_json::to_value(&recent[0]).unwrap();
        assert_eq!(json["score"], 100);
        assert_eq!(json["quizTitle"], quiz.title);
    }
}
