//! Turning generator replies into validated flashcards and questions.

use serde::Deserialize;

use crate::config::QUESTION_OPTION_COUNT;
use crate::domain::{Difficulty, Question};
use crate::error::{Result, StudyError};

/// Question/answer pair as produced by the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDraft {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct RawFlashcard {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: i64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    difficulty: Option<String>,
}

/// The JSON array inside a reply: from the first `[` to the last `]`.
/// Models often wrap the array in prose or code fences.
pub fn extract_json_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

pub fn parse_flashcards(reply: &str) -> Result<Vec<FlashcardDraft>> {
    let raw: Vec<RawFlashcard> = serde_json::from_str(extract_json_array(reply))
        .map_err(|e| StudyError::malformed(format!("flashcards are not a JSON array: {}", e)))?;

    if raw.is_empty() {
        return Err(StudyError::malformed("no flashcards in reply"));
    }

    raw.into_iter()
        .enumerate()
        .map(|(i, card)| {
            let question = card.question.trim();
            let answer = card.answer.trim();
            if question.is_empty() || answer.is_empty() {
                return Err(StudyError::malformed(format!(
                    "flashcard {} is missing its question or answer",
                    i
                )));
            }
            Ok(FlashcardDraft {
                question: question.to_string(),
                answer: answer.to_string(),
            })
        })
        .collect()
}

pub fn parse_questions(reply: &str, default_difficulty: Difficulty) -> Result<Vec<Question>> {
    let raw: Vec<RawQuestion> = serde_json::from_str(extract_json_array(reply))
        .map_err(|e| StudyError::malformed(format!("questions are not a JSON array: {}", e)))?;

    if raw.is_empty() {
        return Err(StudyError::malformed("no questions in reply"));
    }

    raw.into_iter()
        .enumerate()
        .map(|(i, q)| validate_question(i, q, default_difficulty))
        .collect()
}

fn validate_question(index: usize, raw: RawQuestion, default_difficulty: Difficulty) -> Result<Question> {
    let text = raw.question.trim();
    if text.is_empty() {
        return Err(StudyError::malformed(format!("question {} has no text", index)));
    }

    let option_count = raw.options.len();
    let options: [String; QUESTION_OPTION_COUNT] = raw
        .options
        .into_iter()
        .map(|o| o.trim().to_string())
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| {
            StudyError::malformed(format!(
                "question {} has {} options, expected {}",
                index, option_count, QUESTION_OPTION_COUNT
            ))
        })?;

    let correct_answer = u8::try_from(raw.correct_answer)
        .ok()
        .filter(|&c| usize::from(c) < QUESTION_OPTION_COUNT)
        .ok_or_else(|| {
            StudyError::malformed(format!(
                "question {} has correct answer {} outside 0..{}",
                index, raw.correct_answer, QUESTION_OPTION_COUNT
            ))
        })?;

    // Unknown difficulty labels fall back to the quiz's difficulty
    let difficulty = raw
        .difficulty
        .as_deref()
        .and_then(|d| Difficulty::from_str(&d.trim().to_lowercase()))
        .unwrap_or(default_difficulty);

    Ok(Question {
        question: text.to_string(),
        options,
        correct_answer,
        explanation: raw.explanation.trim().to_string(),
        difficulty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_array_from_prose() {
        let reply = "Here are your cards:\n```json\n[{\"a\": 1}]\n```\nEnjoy!";
        assert_eq!(extract_json_array(reply), "[{\"a\": 1}]");
    }

    #[test]
    fn test_extract_json_array_spans_nested_arrays() {
        let reply = "x [ [1], [2] ] y";
        assert_eq!(extract_json_array(reply), "[ [1], [2] ]");
    }

    #[test]
    fn test_extract_json_array_without_brackets() {
        assert_eq!(extract_json_array("  nothing here "), "nothing here");
    }

    #[test]
    fn test_parse_flashcards_trims() {
        let reply = r#"Sure! [{"question": "  What is ATP? ", "answer": "Energy currency "}]"#;
        let cards = parse_flashcards(reply).unwrap();
        assert_eq!(
            cards,
            vec![FlashcardDraft {
                question: "What is ATP?".to_string(),
                answer: "Energy currency".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_flashcards_rejects_garbage() {
        let err = parse_flashcards("I cannot help with that.").unwrap_err();
        assert!(matches!(err, StudyError::MalformedContent(_)));
    }

    #[test]
    fn test_parse_flashcards_rejects_empty_batch() {
        assert!(matches!(parse_flashcards("[]"), Err(StudyError::MalformedContent(_))));
    }

    #[test]
    fn test_parse_flashcards_rejects_blank_answer() {
        let reply = r#"[{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": "  "}]"#;
        assert!(matches!(parse_flashcards(reply), Err(StudyError::MalformedContent(_))));
    }

    #[test]
    fn test_parse_questions_valid() {
        let reply = r#"[
          {"question": "Largest planet?", "options": ["Mars", "Jupiter", "Venus", "Earth"],
           "correctAnswer": 1, "explanation": "Jupiter is the largest.", "difficulty": "Easy"},
          {"question": "Smallest planet?", "options": ["Mercury", "Mars", "Pluto", "Venus"],
           "correctAnswer": 0}
        ]"#;
        let questions = parse_questions(reply, Difficulty::Hard).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer, 1);
        assert_eq!(questions[0].difficulty, Difficulty::Easy);
        assert_eq!(questions[0].options[1], "Jupiter");
        assert_eq!(questions[1].explanation, "");
        assert_eq!(questions[1].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_parse_questions_rejects_three_options() {
        let reply = r#"[{"question": "Q", "options": ["a", "b", "c"], "correctAnswer": 0}]"#;
        let err = parse_questions(reply, Difficulty::Medium).unwrap_err();
        assert!(err.to_string().contains("3 options"));
    }

    #[test]
    fn test_parse_questions_rejects_out_of_range_answer() {
        for bad in ["4", "-1", "300"] {
            let reply = format!(
                r#"[{{"question": "Q", "options": ["a", "b", "c", "d"], "correctAnswer": {}}}]"#,
                bad
            );
            assert!(
                matches!(parse_questions(&reply, Difficulty::Medium), Err(StudyError::MalformedContent(_))),
                "correctAnswer {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_questions_rejects_missing_answer_key() {
        let reply = r#"[{"question": "Q", "options": ["a", "b", "c", "d"]}]"#;
        assert!(matches!(parse_questions(reply, Difficulty::Medium), Err(StudyError::MalformedContent(_))));
    }

    #[test]
    fn test_parse_questions_rejects_empty_batch() {
        assert!(matches!(parse_questions("[]", Difficulty::Medium), Err(StudyError::MalformedContent(_))));
    }
}
