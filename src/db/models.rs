use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::DifficultyLevel;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) is_active: bool,
    pub(crate) is_admin: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) time_limit_seconds: Option<i32>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: i64,
    pub(crate) question_id: i64,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct UserAnswer {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) question_id: i64,
    pub(crate) answer_id: i64,
    pub(crate) answered_at: PrimitiveDateTime,
}

/// One timed run through a fixed question snapshot.
///
/// `selected_question_ids` holds the snapshot as comma-separated ids; `None`
/// only for rows created before snapshots were recorded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizAttempt {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
    pub(crate) time_spent: Option<i32>,
    pub(crate) total_time_limit: Option<i32>,
    pub(crate) difficulty_filter: Option<DifficultyLevel>,
    pub(crate) num_questions: Option<i32>,
    pub(crate) randomize: bool,
    pub(crate) selected_question_ids: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizResult {
    pub(crate) id: i64,
    pub(crate) attempt_id: i64,
    pub(crate) user_id: String,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) score: f64,
    pub(crate) timed_out: bool,
    pub(crate) completed_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct UserStatistics {
    pub(crate) user_id: String,
    pub(crate) total_quizzes: i32,
    pub(crate) total_questions_answered: i32,
    pub(crate) correct_answers: i32,
    pub(crate) average_score: f64,
    pub(crate) total_time_spent: i32,
    pub(crate) last_quiz_date: Option<PrimitiveDateTime>,
}
