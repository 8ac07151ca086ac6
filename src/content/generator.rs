//! Seam to the language-model service that writes flashcards and quizzes.
//!
//! This crate builds the prompts and consumes the reply text; the transport to
//! an actual model vendor lives with the caller behind [`ContentGenerator`].

use serde::Serialize;

use crate::config;
use crate::domain::Difficulty;
use crate::error::Result;

/// The part of an uploaded document the generator needs.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: i64,
    pub title: String,
    /// Extracted plain text
    pub content: String,
}

impl SourceDocument {
    /// Leading slice of the content sent with prompts, cut on a char boundary
    pub fn excerpt(&self) -> &str {
        match self.content.char_indices().nth(config::DOCUMENT_EXCERPT_CHARS) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// A chat-completion style request: one system and one user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub trait ContentGenerator {
    /// Run the request and return the raw reply text.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Generator that replays a stored reply, e.g. one saved from an earlier run.
#[derive(Debug, Clone)]
pub struct CannedResponse(pub String);

impl ContentGenerator for CannedResponse {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        tracing::debug!(model = %request.model, "Replaying canned generator response");
        Ok(self.0.clone())
    }
}

pub fn flashcard_request(doc: &SourceDocument, count: u32, difficulty: Difficulty) -> CompletionRequest {
    CompletionRequest {
        model: config::GENERATOR_MODEL.to_string(),
        system: format!(
            "You are an AI that creates educational flashcards. Generate {count} flashcards with \
             questions and answers based on the document content. Format your response as a JSON \
             array with objects containing \"question\" and \"answer\" fields. Make questions clear \
             and answers concise but complete. Difficulty level: {}.",
            difficulty.as_str()
        ),
        user: format!(
            "Create {count} flashcards from this document:\n\nTitle: {}\n\nContent:\n{}\n\n\
             Return ONLY a valid JSON array of flashcard objects.",
            doc.title,
            doc.excerpt()
        ),
        temperature: config::GENERATOR_TEMPERATURE,
        max_tokens: config::FLASHCARD_MAX_TOKENS,
    }
}

pub fn quiz_request(doc: &SourceDocument, question_count: u32, difficulty: Difficulty) -> CompletionRequest {
    CompletionRequest {
        model: config::GENERATOR_MODEL.to_string(),
        system: format!(
            "You are an AI that creates educational multiple-choice quizzes. Generate \
             {question_count} questions with {} options each, where only one option is correct. \
             Include explanations for correct answers. Format as JSON array with objects \
             containing: \"question\", \"options\" (array of {} strings), \"correctAnswer\" \
             (0-{} index), \"explanation\", \"difficulty\". Difficulty: {}.",
            config::QUESTION_OPTION_COUNT,
            config::QUESTION_OPTION_COUNT,
            config::QUESTION_OPTION_COUNT - 1,
            difficulty.as_str()
        ),
        user: format!(
            "Create a {question_count}-question multiple choice quiz from this document:\n\n\
             Title: {}\n\nContent:\n{}\n\nReturn ONLY a valid JSON array of question objects.",
            doc.title,
            doc.excerpt()
        ),
        temperature: config::GENERATOR_TEMPERATURE,
        max_tokens: config::QUIZ_MAX_TOKENS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> SourceDocument {
        SourceDocument {
            id: 1,
            title: "Cell Biology".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_excerpt_short_content_untouched() {
        let d = doc("Short notes");
        assert_eq!(d.excerpt(), "Short notes");
    }

    #[test]
    fn test_excerpt_truncates_long_content() {
        let d = doc(&"x".repeat(config::DOCUMENT_EXCERPT_CHARS + 500));
        assert_eq!(d.excerpt().len(), config::DOCUMENT_EXCERPT_CHARS);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let d = doc(&"é".repeat(config::DOCUMENT_EXCERPT_CHARS + 10));
        assert_eq!(d.excerpt().chars().count(), config::DOCUMENT_EXCERPT_CHARS);
    }

    #[test]
    fn test_flashcard_request_prompt() {
        let req = flashcard_request(&doc("Mitochondria make ATP."), 8, Difficulty::Hard);
        assert!(req.system.contains("Generate 8 flashcards"));
        assert!(req.system.contains("Difficulty level: hard."));
        assert!(req.user.contains("Title: Cell Biology"));
        assert!(req.user.contains("Mitochondria make ATP."));
        assert_eq!(req.max_tokens, 2000);
        assert_eq!(req.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_quiz_request_prompt() {
        let req = quiz_request(&doc("Osmosis"), 5, Difficulty::Easy);
        assert!(req.system.contains("Generate 5 questions with 4 options each"));
        assert!(req.system.contains("(0-3 index)"));
        assert!(req.user.starts_with("Create a 5-question multiple choice quiz"));
        assert_eq!(req.max_tokens, 3000);
    }

    #[test]
    fn test_canned_response_replays_text() {
        let generator = CannedResponse("[]".to_string());
        let req = flashcard_request(&doc("x"), 1, Difficulty::Medium);
        assert_eq!(generator.complete(&req).unwrap(), "[]");
    }
}
