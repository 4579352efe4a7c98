use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Answer, Category, Question};
use crate::db::types::DifficultyLevel;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CategoryCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CategoryUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryResponse {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: String,
}

impl CategoryResponse {
    pub(crate) fn from_db(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: format_primitive(category.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerCreate {
    #[validate(length(min = 1, message = "answer text must not be empty"))]
    pub(crate) text: String,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "answer text must not be empty"))]
    pub(crate) text: Option<String>,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: Option<bool>,
}

/// `is_correct` is only serialized for administrators.
#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: i64,
    pub(crate) question_id: i64,
    pub(crate) text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_correct: Option<bool>,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: Answer, reveal_correctness: bool) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            text: answer.text,
            is_correct: reveal_correctness.then_some(answer.is_correct),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub(crate) text: String,
    #[serde(default)]
    #[serde(alias = "categoryId")]
    pub(crate) category_id: Option<i64>,
    #[serde(default)]
    pub(crate) difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    #[serde(alias = "timeLimitSeconds")]
    #[validate(range(min = 1, message = "time_limit_seconds must be positive"))]
    pub(crate) time_limit_seconds: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) answers: Vec<AnswerCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub(crate) text: Option<String>,
    #[serde(default)]
    #[serde(alias = "categoryId")]
    pub(crate) category_id: Option<i64>,
    #[serde(default)]
    pub(crate) difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    #[serde(alias = "timeLimitSeconds")]
    #[validate(range(min = 1, message = "time_limit_seconds must be positive"))]
    pub(crate) time_limit_seconds: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) time_limit_seconds: Option<i32>,
    pub(crate) created_at: String,
    pub(crate) answers: Vec<AnswerResponse>,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question, answers: Vec<AnswerResponse>) -> Self {
        Self {
            id: question.id,
            text: question.text,
            category_id: question.category_id,
            difficulty: question.difficulty,
            time_limit_seconds: question.time_limit_seconds,
            created_at: format_primitive(question.created_at),
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_correctness_is_hidden_unless_revealed() {
        let answer = Answer { id: 3, question_id: 1, text: "42".to_string(), is_correct: true };

        let hidden = serde_json::to_value(AnswerResponse::from_db(answer.clone(), false)).unwrap();
        assert!(hidden.get("is_correct").is_none());

        let shown = serde_json::to_value(AnswerResponse::from_db(answer, true)).unwrap();
        assert_eq!(shown["is_correct"], true);
    }

    #[test]
    fn question_create_validates_nested_answers() {
        let payload: QuestionCreate = serde_json::from_value(serde_json::json!({
            "text": "2 + 2?",
            "difficulty": "easy",
            "answers": [{ "text": "", "is_correct": true }]
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let parsed = serde_json::from_value::<QuestionCreate>(serde_json::json!({
            "text": "2 + 2?",
            "difficulty": "impossible"
        }));
        assert!(parsed.is_err());
    }
}
