use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Difficulty;
use crate::config;

/// One multiple-choice question. `correct_answer` indexes into `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub question: String,
  pub options: [String; config::QUESTION_OPTION_COUNT],
  pub correct_answer: u8,
  #[serde(default)]
  pub explanation: String,
  #[serde(default)]
  pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
  pub id: i64,
  pub user_id: i64,
  pub document_id: i64,
  pub title: String,
  /// Order is significant: answers are matched to questions by index
  pub questions: Vec<Question>,
  pub difficulty: Difficulty,
  /// Minutes
  pub time_limit: u32,
  pub category: String,
  pub created_at: DateTime<Utc>,
}

impl Quiz {
  pub fn new(
    user_id: i64,
    document_id: i64,
    title: String,
    questions: Vec<Question>,
    difficulty: Difficulty,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: 0,
      user_id,
      document_id,
      title,
      questions,
      difficulty,
      time_limit: config::DEFAULT_TIME_LIMIT_MINUTES,
      category: config::DEFAULT_CATEGORY.to_string(),
      created_at: now,
    }
  }

  pub fn total_questions(&self) -> usize {
    self.questions.len()
  }
}

/// Convert a raw selected index into a selection. Negative values (the -1
/// sentinel) mean the question was left unanswered.
pub fn selection(raw: i32) -> Option<i32> {
  (raw >= 0).then_some(raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptAnswer {
  pub question_index: usize,
  /// None when unanswered. May be out of the option range, which counts as wrong.
  pub selected_answer: Option<i32>,
  pub is_correct: bool,
}

/// One scored submission. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
  pub id: i64,
  pub quiz_id: i64,
  pub user_id: i64,
  pub answers: Vec<AttemptAnswer>,
  /// Integer percentage
  pub score: i64,
  pub total_questions: i64,
  pub correct_answers: i64,
  /// Seconds
  pub time_spent: i64,
  pub completed_at: DateTime<Utc>,
}
