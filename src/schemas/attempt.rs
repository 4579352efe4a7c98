use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{QuizAttempt, QuizResult};
use crate::db::types::DifficultyLevel;
use crate::services::attempt_builder::{parse_snapshot, AttemptFilters};
use crate::services::errors::QuizError;
use crate::services::scoring::ReviewEntry;

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct AttemptCreate {
    #[serde(default)]
    #[serde(alias = "categoryId")]
    pub(crate) category_id: Option<i64>,
    #[serde(default)]
    pub(crate) difficulty: Option<String>,
    #[serde(default)]
    #[serde(alias = "numQuestions")]
    #[validate(range(min = 1, message = "num_questions must be at least 1"))]
    pub(crate) num_questions: Option<i32>,
    #[serde(default)]
    pub(crate) randomize: bool,
    #[serde(default)]
    #[serde(alias = "totalTimeLimit")]
    #[validate(range(min = 1, message = "total_time_limit must be at least 1 second"))]
    pub(crate) total_time_limit: Option<i32>,
}

impl AttemptCreate {
    pub(crate) fn into_filters(self) -> Result<AttemptFilters, QuizError> {
        let difficulty = self
            .difficulty
            .as_deref()
            .map(str::parse::<DifficultyLevel>)
            .transpose()
            .map_err(|e| QuizError::InvalidArgument(e.to_string()))?;

        Ok(AttemptFilters {
            category_id: self.category_id,
            difficulty,
            num_questions: self.num_questions,
            randomize: self.randomize,
            total_time_limit: self.total_time_limit,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: i64,
    pub(crate) category_id: Option<i64>,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
    pub(crate) time_spent: Option<i32>,
    pub(crate) total_time_limit: Option<i32>,
    pub(crate) difficulty_filter: Option<DifficultyLevel>,
    pub(crate) num_questions: Option<i32>,
    pub(crate) randomize: bool,
    pub(crate) selected_count: usize,
    pub(crate) question_ids: Vec<i64>,
}

impl AttemptResponse {
    pub(crate) fn from_db(attempt: QuizAttempt) -> Self {
        let question_ids =
            parse_snapshot(attempt.selected_question_ids.as_deref()).unwrap_or_default();
        Self {
            id: attempt.id,
            category_id: attempt.category_id,
            started_at: format_primitive(attempt.started_at),
            completed_at: attempt.completed_at.map(format_primitive),
            time_spent: attempt.time_spent,
            total_time_limit: attempt.total_time_limit,
            difficulty_filter: attempt.difficulty_filter,
            num_questions: attempt.num_questions,
            randomize: attempt.randomize,
            selected_count: question_ids.len(),
            question_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerSubmit {
    #[serde(alias = "questionId")]
    pub(crate) question_id: i64,
    #[serde(alias = "answerId")]
    pub(crate) answer_id: i64,
}

/// Acknowledges a submission without revealing correctness.
#[derive(Debug, Serialize)]
pub(crate) struct AnswerSubmitResponse {
    pub(crate) id: i64,
    pub(crate) question_id: i64,
    pub(crate) answer_id: i64,
    pub(crate) answered_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResultResponse {
    pub(crate) id: i64,
    pub(crate) attempt_id: i64,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) score: f64,
    pub(crate) time_spent: i32,
    pub(crate) timed_out: bool,
    pub(crate) completed_at: String,
}

impl QuizResultResponse {
    pub(crate) fn from_db(result: QuizResult, time_spent: i32) -> Self {
        Self {
            id: result.id,
            attempt_id: result.attempt_id,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            score: result.score,
            time_spent,
            timed_out: result.timed_out,
            completed_at: format_primitive(result.completed_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewItemResponse {
    pub(crate) question_id: i64,
    pub(crate) question_text: String,
    pub(crate) user_answer_id: Option<i64>,
    pub(crate) user_answer_text: Option<String>,
    pub(crate) correct_answer_ids: Vec<i64>,
    pub(crate) correct_answer_texts: Vec<String>,
    pub(crate) is_correct: bool,
}

impl From<ReviewEntry> for ReviewItemResponse {
    fn from(entry: ReviewEntry) -> Self {
        Self {
            question_id: entry.question_id,
            question_text: entry.question_text,
            user_answer_id: entry.user_answer_id,
            user_answer_text: entry.user_answer_text,
            correct_answer_ids: entry.correct_answer_ids,
            correct_answer_texts: entry.correct_answer_texts,
            is_correct: entry.is_correct,
        }
    }
}
