use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "easy" => Some(Self::Easy),
      "medium" => Some(Self::Medium),
      "hard" => Some(Self::Hard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Easy => "easy",
      Self::Medium => "medium",
      Self::Hard => "hard",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
  pub id: i64,
  pub user_id: i64,
  /// Source document; documents themselves live outside this crate
  pub document_id: i64,
  pub question: String,
  pub answer: String,
  pub difficulty: Difficulty,
  pub category: String,
  pub is_favorite: bool,
  pub tags: Vec<String>,

  // Review statistics, correct_count <= review_count
  pub review_count: i64,
  pub correct_count: i64,
  pub last_reviewed: Option<DateTime<Utc>>,
  pub next_review: DateTime<Utc>,

  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Flashcard {
  /// A fresh card, due immediately.
  pub fn new(
    user_id: i64,
    document_id: i64,
    question: String,
    answer: String,
    difficulty: Difficulty,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: 0,
      user_id,
      document_id,
      question,
      answer,
      difficulty,
      category: config::DEFAULT_CATEGORY.to_string(),
      is_favorite: false,
      tags: Vec::new(),
      review_count: 0,
      correct_count: 0,
      last_reviewed: None,
      next_review: now,
      created_at: now,
      updated_at: now,
    }
  }

  /// Percentage of reviews answered correctly, 0 for an unreviewed card.
  pub fn success_rate(&self) -> i64 {
    if self.review_count <= 0 {
      return 0;
    }
    let correct = self.correct_count.clamp(0, self.review_count);
    // Round half up on non-negative integers
    (correct * 200 + self.review_count) / (self.review_count * 2)
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review <= now
  }
}
