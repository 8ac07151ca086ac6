//! End-to-end study flow through the public service API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use studydeck::content::CannedResponse;
use studydeck::content::SourceDocument;
use studydeck::db::{self, FlashcardFilter};
use studydeck::domain::{selection, Difficulty};
use studydeck::services::StudyService;
use studydeck::StudyError;

const QUIZ_REPLY: &str = r#"```json
[
  {"question": "Q1", "options": ["a", "b", "c", "d"], "correctAnswer": 0, "explanation": "first"},
  {"question": "Q2", "options": ["a", "b", "c", "d"], "correctAnswer": 1, "explanation": "second"},
  {"question": "Q3", "options": ["a", "b", "c", "d"], "correctAnswer": 2, "explanation": "third"},
  {"question": "Q4", "options": ["a", "b", "c", "d"], "correctAnswer": 3, "explanation": "fourth"},
  {"question": "Q5", "options": ["a", "b", "c", "d"], "correctAnswer": 0, "explanation": "fifth"}
]
```"#;

const CARDS_REPLY: &str = r#"[{"question": "Define osmosis", "answer": "Diffusion of water across a membrane"}]"#;

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap()
}

fn service() -> (TempDir, StudyService) {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::init_db(&dir.path().join("data").join("studydeck.db")).unwrap();
    (dir, StudyService::with_clock(pool, noon))
}

fn notes() -> SourceDocument {
    SourceDocument {
        id: 3,
        title: "Biology Notes".to_string(),
        content: "Osmosis and diffusion.".to_string(),
    }
}

#[test]
fn quiz_submission_is_graded_and_stored() {
    let (_dir, service) = service();
    let quiz = service
        .generate_quiz(1, &notes(), &CannedResponse(QUIZ_REPLY.into()), 5, Difficulty::Medium, 20)
        .unwrap();

    let answers: Vec<Option<i32>> = [0, 1, 9, 3, 1].into_iter().map(selection).collect();
    let graded = service.submit_attempt(1, quiz.id, &answers, 120).unwrap();

    assert_eq!(graded.results.correct_answers, 3);
    assert_eq!(graded.results.score, 60);
    assert_eq!(graded.results.answers[2].explanation, "third");

    let stored = service.quiz_attempts(1, quiz.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].score, 60);
    assert_eq!(stored[0].completed_at, noon());
}

#[test]
fn unanswered_sentinel_counts_as_wrong() {
    let (_dir, service) = service();
    let quiz = service
        .generate_quiz(1, &notes(), &CannedResponse(QUIZ_REPLY.into()), 5, Difficulty::Medium, 20)
        .unwrap();

    let answers: Vec<Option<i32>> = [-1, -1, -1, -1, -1].into_iter().map(selection).collect();
    let graded = service.submit_attempt(1, quiz.id, &answers, 5).unwrap();
    assert_eq!(graded.results.score, 0);

    let short = service.submit_attempt(1, quiz.id, &answers[..4], 5).unwrap_err();
    assert!(matches!(short, StudyError::InvalidInput(_)));
}

#[test]
fn reviews_space_cards_out() {
    let (_dir, service) = service();
    let cards = service
        .generate_flashcards(1, &notes(), &CannedResponse(CARDS_REPLY.into()), 1, Difficulty::Hard)
        .unwrap();
    let id = cards[0].id;

    let missed = service.review_flashcard(1, id, false).unwrap();
    assert_eq!(missed.next_review, noon() + Duration::days(1));
    assert_eq!(missed.correct_count, 0);

    let correct = service.review_flashcard(1, id, true).unwrap();
    assert_eq!(correct.review_count, 2);
    assert_eq!(correct.correct_count, 1);
    assert_eq!(correct.next_review, noon() + Duration::days(2));
    assert_eq!(correct.success_rate(), 50);

    let stored = service.list_flashcards(1, &FlashcardFilter::default()).unwrap();
    assert_eq!(stored, vec![correct]);
    assert!(service.due_flashcards(1, 10).unwrap().is_empty());
}

#[test]
fn records_are_private_to_their_owner() {
    let (_dir, service) = service();
    let cards = service
        .generate_flashcards(1, &notes(), &CannedResponse(CARDS_REPLY.into()), 1, Difficulty::Easy)
        .unwrap();
    let quiz = service
        .generate_quiz(1, &notes(), &CannedResponse(QUIZ_REPLY.into()), 5, Difficulty::Easy, 20)
        .unwrap();

    assert!(service.review_flashcard(2, cards[0].id, true).unwrap_err().is_not_found());
    assert!(service.toggle_favorite(2, cards[0].id).unwrap_err().is_not_found());
    assert!(service.get_quiz(2, quiz.id).unwrap_err().is_not_found());
    assert!(service.list_quizzes(2, None).unwrap().is_empty());
    assert_eq!(service.dashboard(2).unwrap().overview.total_flashcards, 0);
}

#[test]
fn malformed_generator_output_is_rejected() {
    let (_dir, service) = service();
    let three_options = r#"[{"question": "Q", "options": ["a", "b", "c"], "correctAnswer": 0}]"#;
    let err = service
        .generate_quiz(1, &notes(), &CannedResponse(three_options.into()), 1, Difficulty::Medium, 10)
        .unwrap_err();
    assert!(matches!(err, StudyError::MalformedContent(_)));

    let bad_index = r#"[{"question": "Q", "options": ["a", "b", "c", "d"], "correctAnswer": 4}]"#;
    let err = service
        .generate_quiz(1, &notes(), &CannedResponse(bad_index.into()), 1, Difficulty::Medium, 10)
        .unwrap_err();
    assert!(matches!(err, StudyError::MalformedContent(_)));

    assert!(service.list_quizzes(1, None).unwrap().is_empty());
}
