use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::QuizResult;

const COLUMNS: &str = "\
    id, attempt_id, user_id, total_questions, correct_answers, score, timed_out, completed_at";

pub(crate) struct CreateResult<'a> {
    pub(crate) attempt_id: i64,
    pub(crate) user_id: &'a str,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) score: f64,
    pub(crate) timed_out: bool,
    pub(crate) completed_at: PrimitiveDateTime,
}

/// Result row joined with the category of its attempt.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CategorizedResultRow {
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) score: f64,
    pub(crate) time_spent: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TimedResultRow {
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) score: f64,
    pub(crate) time_spent: i32,
    pub(crate) completed_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateResult<'_>,
) -> Result<QuizResult, sqlx::Error> {
    sqlx::query_as::<_, QuizResult>(&format!(
        "INSERT INTO quiz_results (
            attempt_id, user_id, total_questions, correct_answers, score, timed_out, completed_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}"
    ))
    .bind(params.attempt_id)
    .bind(params.user_id)
    .bind(params.total_questions)
    .bind(params.correct_answers)
    .bind(params.score)
    .bind(params.timed_out)
    .bind(params.completed_at)
    .fetch_one(executor)
    .await
}

#[cfg(test)]
pub(crate) async fn count_by_attempt(pool: &PgPool, attempt_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM quiz_results WHERE attempt_id = $1")
        .bind(attempt_id)
        .fetch_one(pool)
        .await
}

/// Results whose attempt still has a category; uncategorised ones are skipped.
pub(crate) async fn list_categorized_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<CategorizedResultRow>, sqlx::Error> {
    sqlx::query_as::<_, CategorizedResultRow>(
        "SELECT c.id AS category_id,
                c.name AS category_name,
                r.total_questions,
                r.correct_answers,
                r.score,
                COALESCE(a.time_spent, 0) AS time_spent
         FROM quiz_results r
         JOIN quiz_attempts a ON a.id = r.attempt_id
         JOIN categories c ON c.id = a.category_id
         WHERE r.user_id = $1
         ORDER BY c.name, r.completed_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_since_for_user(
    pool: &PgPool,
    user_id: &str,
    since: PrimitiveDateTime,
) -> Result<Vec<TimedResultRow>, sqlx::Error> {
    sqlx::query_as::<_, TimedResultRow>(
        "SELECT r.total_questions,
                r.correct_answers,
                r.score,
                COALESCE(a.time_spent, 0) AS time_spent,
                r.completed_at
         FROM quiz_results r
         JOIN quiz_attempts a ON a.id = r.attempt_id
         WHERE r.user_id = $1 AND r.completed_at >= $2
         ORDER BY r.completed_at",
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(pool)
    .await
}
