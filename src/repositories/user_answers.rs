use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::UserAnswer;

const COLUMNS: &str = "id, user_id, question_id, answer_id, answered_at";

/// A user's submission joined with the answer it points at.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SubmissionRow {
    pub(crate) question_id: i64,
    pub(crate) answer_id: i64,
    pub(crate) answer_text: String,
    pub(crate) is_correct: bool,
}

pub(crate) async fn create(
    pool: &PgPool,
    user_id: &str,
    question_id: i64,
    answer_id: i64,
    answered_at: PrimitiveDateTime,
) -> Result<UserAnswer, sqlx::Error> {
    sqlx::query_as::<_, UserAnswer>(&format!(
        "INSERT INTO user_answers (user_id, question_id, answer_id, answered_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(question_id)
    .bind(answer_id)
    .bind(answered_at)
    .fetch_one(pool)
    .await
}

/// Every submission by `user_id` for the given questions, oldest first.
pub(crate) async fn list_for_questions(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    question_ids: &[i64],
) -> Result<Vec<SubmissionRow>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, SubmissionRow>(
        "SELECT ua.question_id, ua.answer_id, a.text AS answer_text, a.is_correct
         FROM user_answers ua
         JOIN answers a ON a.id = ua.answer_id
         WHERE ua.user_id = $1 AND ua.question_id = ANY($2)
         ORDER BY ua.answered_at, ua.id",
    )
    .bind(user_id)
    .bind(question_ids)
    .fetch_all(executor)
    .await
}
