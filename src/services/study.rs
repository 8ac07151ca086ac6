//! Request-level study operations.
//!
//! Each operation is one unit of work against the shared connection: fetch the
//! caller's record, run the pure scheduler or grader, persist the result.
//! Ownership is enforced here by scoping every lookup to the user id.

use chrono::{DateTime, Duration, Utc};

use crate::config;
use crate::content::{
    flashcard_request, parse_flashcards, parse_questions, quiz_request, ContentGenerator,
    SourceDocument,
};
use crate::db::{self, Analytics, AttemptWithQuiz, Dashboard, DbPool, FlashcardFilter, WeeklyGoals};
use crate::domain::{Difficulty, Flashcard, Quiz, QuizAttempt};
use crate::error::{Result, StudyError};
use crate::grading::{self, GradedAttempt};
use crate::srs;

pub type Clock = fn() -> DateTime<Utc>;

#[derive(Clone)]
pub struct StudyService {
    pool: DbPool,
    clock: Clock,
}

impl StudyService {
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Utc::now)
    }

    /// Service with a fixed time source, for deterministic scheduling
    pub fn with_clock(pool: DbPool, clock: Clock) -> Self {
        Self { pool, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // ==================== Generation ====================

    /// Ask the generator for flashcards about a document and store them.
    pub fn generate_flashcards(
        &self,
        user_id: i64,
        doc: &SourceDocument,
        generator: &dyn ContentGenerator,
        count: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<Flashcard>> {
        if count == 0 {
            return Err(StudyError::invalid("flashcard count must be positive"));
        }

        let reply = generator.complete(&flashcard_request(doc, count, difficulty))?;
        let drafts = parse_flashcards(&reply)?;
        if drafts.len() != count as usize {
            tracing::debug!(requested = count, received = drafts.len(), "Generator returned a different card count");
        }

        let now = self.now();
        let mut cards: Vec<Flashcard> = drafts
            .into_iter()
            .map(|draft| {
                let mut card = Flashcard::new(user_id, doc.id, draft.question, draft.answer, difficulty, now);
                card.category = doc.title.clone();
                card
            })
            .collect();

        let conn = db::try_lock(&self.pool)?;
        let ids = db::insert_flashcards(&conn, &cards)?;
        for (card, id) in cards.iter_mut().zip(ids) {
            card.id = id;
        }

        tracing::info!(user_id, document_id = doc.id, count = cards.len(), "Generated flashcards");
        Ok(cards)
    }

    /// Ask the generator for a multiple-choice quiz about a document and store it.
    pub fn generate_quiz(
        &self,
        user_id: i64,
        doc: &SourceDocument,
        generator: &dyn ContentGenerator,
        question_count: u32,
        difficulty: Difficulty,
        time_limit: u32,
    ) -> Result<Quiz> {
        if question_count == 0 {
            return Err(StudyError::invalid("question count must be positive"));
        }
        if time_limit == 0 {
            return Err(StudyError::invalid("time limit must be positive"));
        }

        let reply = generator.complete(&quiz_request(doc, question_count, difficulty))?;
        let questions = parse_questions(&reply, difficulty)?;

        let mut quiz = Quiz::new(
            user_id,
            doc.id,
            format!("{} - Quiz", doc.title),
            questions,
            difficulty,
            self.now(),
        );
        quiz.time_limit = time_limit;
        quiz.category = doc.title.clone();

        let conn = db::try_lock(&self.pool)?;
        quiz.id = db::insert_quiz(&conn, &quiz)?;

        tracing::info!(user_id, quiz_id = quiz.id, questions = quiz.questions.len(), "Generated quiz");
        Ok(quiz)
    }

    // ==================== Flashcards ====================

    pub fn list_flashcards(&self, user_id: i64, filter: &FlashcardFilter) -> Result<Vec<Flashcard>> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::list_flashcards(&conn, user_id, filter)?)
    }

    pub fn due_flashcards(&self, user_id: i64, limit: usize) -> Result<Vec<Flashcard>> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::get_due_flashcards(&conn, user_id, self.now(), limit)?)
    }

    /// Record a study review and reschedule the card.
    pub fn review_flashcard(&self, user_id: i64, id: i64, correct: bool) -> Result<Flashcard> {
        let conn = db::try_lock(&self.pool)?;
        let card = db::get_flashcard(&conn, user_id, id)?.ok_or(StudyError::NotFound("flashcard"))?;

        let reviewed = srs::record_review(&card, correct, self.now());
        if !db::apply_review(&conn, &reviewed, correct)? {
            return Err(StudyError::NotFound("flashcard"));
        }

        tracing::info!(
            flashcard_id = id,
            correct,
            correct_count = reviewed.correct_count,
            next_review = %reviewed.next_review,
            "Recorded review"
        );
        Ok(reviewed)
    }

    pub fn toggle_favorite(&self, user_id: i64, id: i64) -> Result<Flashcard> {
        let conn = db::try_lock(&self.pool)?;
        let mut card = db::get_flashcard(&conn, user_id, id)?.ok_or(StudyError::NotFound("flashcard"))?;

        let now = self.now();
        card.is_favorite = !card.is_favorite;
        card.updated_at = now;
        if !db::set_favorite(&conn, user_id, id, card.is_favorite, now)? {
            return Err(StudyError::NotFound("flashcard"));
        }
        Ok(card)
    }

    pub fn delete_flashcard(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = db::try_lock(&self.pool)?;
        if !db::delete_flashcard(&conn, user_id, id)? {
            return Err(StudyError::NotFound("flashcard"));
        }
        tracing::info!(flashcard_id = id, "Deleted flashcard");
        Ok(())
    }

    // ==================== Quizzes ====================

    pub fn get_quiz(&self, user_id: i64, id: i64) -> Result<Quiz> {
        let conn = db::try_lock(&self.pool)?;
        db::get_quiz(&conn, user_id, id)?.ok_or(StudyError::NotFound("quiz"))
    }

    pub fn list_quizzes(&self, user_id: i64, document_id: Option<i64>) -> Result<Vec<Quiz>> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::list_quizzes(&conn, user_id, document_id)?)
    }

    /// Grade a submission and store the attempt. `answers` must hold one entry
    /// per question, `None` for unanswered.
    pub fn submit_attempt(
        &self,
        user_id: i64,
        quiz_id: i64,
        answers: &[Option<i32>],
        time_spent_secs: i64,
    ) -> Result<GradedAttempt> {
        let conn = db::try_lock(&self.pool)?;
        let quiz = db::get_quiz(&conn, user_id, quiz_id)?.ok_or(StudyError::NotFound("quiz"))?;

        let mut graded = grading::grade(&quiz, answers, time_spent_secs, self.now())?;
        graded.attempt.id = db::insert_attempt(&conn, &graded.attempt)?;

        tracing::info!(
            quiz_id,
            attempt_id = graded.attempt.id,
            score = graded.attempt.score,
            "Graded quiz attempt"
        );
        Ok(graded)
    }

    pub fn quiz_attempts(&self, user_id: i64, quiz_id: i64) -> Result<Vec<QuizAttempt>> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::list_attempts_for_quiz(&conn, user_id, quiz_id)?)
    }

    pub fn recent_attempts(&self, user_id: i64) -> Result<Vec<AttemptWithQuiz>> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::list_recent_attempts(&conn, user_id, config::ATTEMPT_HISTORY_LIMIT)?)
    }

    /// Delete a quiz together with all of its attempts.
    pub fn delete_quiz(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = db::try_lock(&self.pool)?;
        if !db::delete_quiz(&conn, user_id, id)? {
            return Err(StudyError::NotFound("quiz"));
        }
        tracing::info!(quiz_id = id, "Deleted quiz");
        Ok(())
    }

    // ==================== Progress ====================

    pub fn dashboard(&self, user_id: i64) -> Result<Dashboard> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::dashboard(&conn, user_id, self.now())?)
    }

    pub fn analytics(&self, user_id: i64, period_days: i64) -> Result<Analytics> {
        if period_days <= 0 {
            return Err(StudyError::invalid("analytics period must be positive"));
        }
        let since = Duration::try_days(period_days)
            .and_then(|period| self.now().checked_sub_signed(period))
            .ok_or_else(|| StudyError::invalid(format!("analytics period of {} days is out of range", period_days)))?;

        let conn = db::try_lock(&self.pool)?;
        Ok(db::analytics(&conn, user_id, since)?)
    }

    pub fn weekly_goals(&self, user_id: i64) -> Result<WeeklyGoals> {
        let conn = db::try_lock(&self.pool)?;
        Ok(db::weekly_goals(&conn, user_id, self.now())?)
    }
}
