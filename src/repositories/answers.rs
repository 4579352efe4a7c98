use sqlx::PgPool;

use crate::db::models::Answer;

const COLUMNS: &str = "id, question_id, text, is_correct";

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!("SELECT {COLUMNS} FROM answers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_question(
    pool: &PgPool,
    question_id: i64,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE question_id = $1 ORDER BY id"
    ))
    .bind(question_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_questions(
    executor: impl sqlx::PgExecutor<'_>,
    question_ids: &[i64],
) -> Result<Vec<Answer>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE question_id = ANY($1) ORDER BY question_id, id"
    ))
    .bind(question_ids)
    .fetch_all(executor)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
    text: &str,
    is_correct: bool,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (question_id, text, is_correct)
         VALUES ($1, $2, $3)
         RETURNING {COLUMNS}"
    ))
    .bind(question_id)
    .bind(text)
    .bind(is_correct)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    text: Option<&str>,
    is_correct: Option<bool>,
) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "UPDATE answers SET
            text = COALESCE($1, text),
            is_correct = COALESCE($2, is_correct)
         WHERE id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(text)
    .bind(is_correct)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM answers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
