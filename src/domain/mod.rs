pub mod flashcard;
pub mod quiz;

pub use flashcard::{Difficulty, Flashcard};
pub use quiz::{selection, AttemptAnswer, Question, Quiz, QuizAttempt};
