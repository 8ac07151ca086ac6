//! Generated study content: prompts out, validated cards and questions in.

pub mod generator;
pub mod parse;

pub use generator::{
    flashcard_request, quiz_request, CannedResponse, CompletionRequest, ContentGenerator,
    SourceDocument,
};
pub use parse::{extract_json_array, parse_flashcards, parse_questions, FlashcardDraft};
