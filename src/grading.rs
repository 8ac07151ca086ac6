//! Quiz grading.
//!
//! Scores a submitted answer set against a quiz's answer key and builds both
//! the attempt record to store and a read-only review of every question.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AttemptAnswer, Quiz, QuizAttempt};
use crate::error::{Result, StudyError};

/// One answer joined with its question, for showing results to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnswer {
    pub question_index: usize,
    pub selected_answer: Option<i32>,
    pub is_correct: bool,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub score: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub percentage: i64,
    pub answers: Vec<DetailedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedAttempt {
    pub attempt: QuizAttempt,
    pub results: QuizResults,
}

/// `round(correct / total * 100)` with half-up rounding, 0 for an empty quiz.
pub fn score_percentage(correct: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (correct * 200 + total) / (total * 2)
}

/// Grade a submission. `submitted` must have exactly one entry per question;
/// unanswered questions are `None`.
pub fn grade(
    quiz: &Quiz,
    submitted: &[Option<i32>],
    time_spent_secs: i64,
    now: DateTime<Utc>,
) -> Result<GradedAttempt> {
    if submitted.len() != quiz.total_questions() {
        return Err(StudyError::invalid(format!(
            "expected {} answers, got {}",
            quiz.total_questions(),
            submitted.len()
        )));
    }
    if time_spent_secs < 0 {
        return Err(StudyError::invalid("time spent cannot be negative"));
    }

    let answers: Vec<AttemptAnswer> = quiz
        .questions
        .iter()
        .zip(submitted)
        .enumerate()
        .map(|(index, (question, selected))| AttemptAnswer {
            question_index: index,
            selected_answer: *selected,
            is_correct: *selected == Some(i32::from(question.correct_answer)),
        })
        .collect();

    let total_questions = quiz.total_questions() as i64;
    let correct_answers = answers.iter().filter(|a| a.is_correct).count() as i64;
    let score = score_percentage(correct_answers, total_questions);

    let detailed = answers
        .iter()
        .zip(&quiz.questions)
        .map(|(answer, question)| DetailedAnswer {
            question_index: answer.question_index,
            selected_answer: answer.selected_answer,
            is_correct: answer.is_correct,
            question: question.question.clone(),
            options: question.options.to_vec(),
            correct_answer: question.correct_answer,
            explanation: question.explanation.clone(),
        })
        .collect();

    let attempt = QuizAttempt {
        id: 0,
        quiz_id: quiz.id,
        user_id: quiz.user_id,
        answers,
        score,
        total_questions,
        correct_answers,
        time_spent: time_spent_secs,
        completed_at: now,
    };

    Ok(GradedAttempt {
        attempt,
        results: QuizResults {
            score,
            correct_answers,
            total_questions,
            percentage: score,
            answers: detailed,
        },
    })
}
