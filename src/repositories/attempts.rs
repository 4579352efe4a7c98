use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::QuizAttempt;
use crate::db::types::DifficultyLevel;

pub(crate) const COLUMNS: &str = "\
    id, user_id, category_id, started_at, completed_at, time_spent, total_time_limit, \
    difficulty_filter, num_questions, randomize, selected_question_ids";

pub(crate) struct CreateAttempt<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) category_id: Option<i64>,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) total_time_limit: Option<i32>,
    pub(crate) difficulty_filter: Option<DifficultyLevel>,
    pub(crate) num_questions: Option<i32>,
    pub(crate) randomize: bool,
    pub(crate) selected_question_ids: String,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<QuizAttempt, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "INSERT INTO quiz_attempts (
            user_id, category_id, started_at, total_time_limit, difficulty_filter,
            num_questions, randomize, selected_question_ids
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}"
    ))
    .bind(params.user_id)
    .bind(params.category_id)
    .bind(params.started_at)
    .bind(params.total_time_limit)
    .bind(params.difficulty_filter)
    .bind(params.num_questions)
    .bind(params.randomize)
    .bind(params.selected_question_ids)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_for_user(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    user_id: &str,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Same as [`find_for_user`] but holds a row lock until the transaction ends.
pub(crate) async fn lock_for_user(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    user_id: &str,
) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Sets the terminal completion fields. Returns `false` when the attempt was
/// already completed.
pub(crate) async fn mark_completed(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    completed_at: PrimitiveDateTime,
    time_spent: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE quiz_attempts
         SET completed_at = $1, time_spent = $2
         WHERE id = $3 AND completed_at IS NULL",
    )
    .bind(completed_at)
    .bind(time_spent)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts
         WHERE user_id = $1
         ORDER BY started_at DESC, id DESC
         OFFSET $2 LIMIT $3"
    ))
    .bind(user_id)
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_user(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
