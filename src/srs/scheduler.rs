use chrono::{DateTime, Duration, Utc};

use crate::config::{CORRECT_INTERVAL_STEP_DAYS, MAX_INTERVAL_DAYS, MISSED_INTERVAL_DAYS};
use crate::domain::Flashcard;

/// Interval until the next review.
///
/// Correct reviews grow linearly with the lifetime correct count (after this
/// review is counted), capped at a month. A miss brings the card back the next
/// day but does not reset the lifetime count.
pub fn days_to_add(correct_count: i64, was_correct: bool) -> i64 {
  if was_correct {
    (correct_count * CORRECT_INTERVAL_STEP_DAYS).min(MAX_INTERVAL_DAYS)
  } else {
    MISSED_INTERVAL_DAYS
  }
}

/// Apply one study review to a card and schedule its next appearance.
///
/// Pure: the caller persists the returned record.
pub fn record_review(card: &Flashcard, was_correct: bool, now: DateTime<Utc>) -> Flashcard {
  let mut updated = card.clone();
  updated.review_count += 1;
  if was_correct {
    updated.correct_count += 1;
  }
  updated.last_reviewed = Some(now);
  updated.next_review = now + Duration::days(days_to_add(updated.correct_count, was_correct));
  updated.updated_at = now;
  updated
}
