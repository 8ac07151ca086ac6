//! Progress statistics: dashboard totals, analytics and weekly goals

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result};
use serde::Serialize;

use super::{db_time, get_due_count, list_recent_attempts, AttemptWithQuiz};
use crate::config;
use crate::domain::Difficulty;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_flashcards: i64,
    pub favorite_flashcards: i64,
    pub due_flashcards: i64,
    pub total_quizzes: i64,
    pub total_quiz_attempts: i64,
    /// Rounded mean of all attempt scores, 0 with no attempts
    pub average_quiz_score: i64,
    /// Distinct days with a review or quiz attempt in the activity window
    pub study_days_this_month: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub overview: DashboardOverview,
    pub recent_attempts: Vec<AttemptWithQuiz>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPerformanceDay {
    /// YYYY-MM-DD (UTC)
    pub date: String,
    pub avg_score: f64,
    pub total_attempts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyStats {
    pub difficulty: Difficulty,
    pub count: i64,
    /// Mean per-card success rate; unreviewed cards count as 0
    pub avg_success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub quiz_performance: Vec<QuizPerformanceDay>,
    pub flashcard_stats: Vec<DifficultyStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub target: i64,
    pub current: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyGoals {
    pub quizzes: GoalProgress,
    pub flashcards: GoalProgress,
}

/// Sunday 00:00 UTC of the week containing `now`
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive() - Duration::days(i64::from(now.weekday().num_days_from_sunday()));
    date.and_time(NaiveTime::MIN).and_utc()
}

fn count(conn: &Connection, sql: &str, user_id: i64) -> Result<i64> {
    conn.query_row(sql, params![user_id], |row| row.get(0))
}

pub fn get_average_quiz_score(conn: &Connection, user_id: i64) -> Result<i64> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(score) FROM quiz_attempts WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(avg.map(|a| a.round() as i64).unwrap_or(0))
}

pub fn get_study_days_since(conn: &Connection, user_id: i64, since: DateTime<Utc>) -> Result<i64> {
    conn.query_row(
        r#"
    SELECT COUNT(*) FROM (
      SELECT substr(reviewed_at, 1, 10) FROM review_logs WHERE user_id = ?1 AND reviewed_at >= ?2
      UNION
      SELECT substr(completed_at, 1, 10) FROM quiz_attempts WHERE user_id = ?1 AND completed_at >= ?2
    )
    "#,
        params![user_id, db_time(&since)],
        |row| row.get(0),
    )
}

pub fn dashboard(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<Dashboard> {
    let overview = DashboardOverview {
        total_flashcards: count(conn, "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1", user_id)?,
        favorite_flashcards: count(
            conn,
            "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1 AND is_favorite = 1",
            user_id,
        )?,
        due_flashcards: get_due_count(conn, user_id, now)?,
        total_quizzes: count(conn, "SELECT COUNT(*) FROM quizzes WHERE user_id = ?1", user_id)?,
        total_quiz_attempts: count(conn, "SELECT COUNT(*) FROM quiz_attempts WHERE user_id = ?1", user_id)?,
        average_quiz_score: get_average_quiz_score(conn, user_id)?,
        study_days_this_month: get_study_days_since(
            conn,
            user_id,
            now - Duration::days(config::ACTIVITY_WINDOW_DAYS),
        )?,
    };

    Ok(Dashboard {
        overview,
        recent_attempts: list_recent_attempts(conn, user_id, config::RECENT_ACTIVITY_LIMIT)?,
    })
}

/// Quiz performance for attempts completed at or after `since`, and
/// flashcard success over all of the user's cards
pub fn analytics(conn: &Connection, user_id: i64, since: DateTime<Utc>) -> Result<Analytics> {
    let mut stmt = conn.prepare(
        r#"
    SELECT substr(completed_at, 1, 10) AS day, AVG(score), COUNT(*)
    FROM quiz_attempts
    WHERE user_id = ?1 AND completed_at >= ?2
    GROUP BY day
    ORDER BY day ASC
    "#,
    )?;
    let quiz_performance = stmt
        .query_map(params![user_id, db_time(&since)], |row| {
            Ok(QuizPerformanceDay {
                date: row.get(0)?,
                avg_score: row.get(1)?,
                total_attempts: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        r#"
    SELECT difficulty,
           COUNT(*),
           AVG(CASE WHEN review_count = 0 THEN 0.0 ELSE correct_count * 100.0 / review_count END)
    FROM flashcards
    WHERE user_id = ?1
    GROUP BY difficulty
    ORDER BY CASE difficulty WHEN 'easy' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END
    "#,
    )?;
    let flashcard_stats = stmt
        .query_map(params![user_id], |row| {
            let difficulty: String = row.get(0)?;
            Ok(DifficultyStats {
                difficulty: Difficulty::from_str(&difficulty).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        Type::Text,
                        format!("unknown difficulty '{}'", difficulty).into(),
                    )
                })?,
                count: row.get(1)?,
                avg_success_rate: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(Analytics {
        quiz_performance,
        flashcard_stats,
    })
}

pub fn weekly_goals(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<WeeklyGoals> {
    let since = db_time(&week_start(now));

    let quizzes: i64 = conn.query_row(
        "SELECT COUNT(*) FROM quiz_attempts WHERE user_id = ?1 AND completed_at >= ?2",
        params![user_id, since],
        |row| row.get(0),
    )?;
    let flashcards: i64 = conn.query_row(
        "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1 AND last_reviewed >= ?2",
        params![user_id, since],
        |row| row.get(0),
    )?;

    Ok(WeeklyGoals {
        quizzes: GoalProgress {
            target: config::WEEKLY_QUIZ_TARGET,
            current: quizzes,
        },
        flashcards: GoalProgress {
            target: config::WEEKLY_FLASHCARD_TARGET,
            current: flashcards,
        },
    })
}
