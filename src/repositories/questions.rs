use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Question;
use crate::db::types::DifficultyLevel;

pub(crate) const COLUMNS: &str =
    "id, text, category_id, difficulty, time_limit_seconds, created_at";

/// Catalog selection; unset fields do not constrain the result.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QuestionFilter {
    pub(crate) category_id: Option<i64>,
    pub(crate) difficulty: Option<DifficultyLevel>,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: QuestionFilter) {
    builder.push(" WHERE TRUE");
    if let Some(category_id) = filter.category_id {
        builder.push(" AND category_id = ");
        builder.push_bind(category_id);
    }
    if let Some(difficulty) = filter.difficulty {
        builder.push(" AND difficulty = ");
        builder.push_bind(difficulty);
    }
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_ids(
    executor: impl sqlx::PgExecutor<'_>,
    ids: &[i64],
) -> Result<Vec<Question>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(executor)
        .await
}

/// Ids matching `filter` in catalog order (ascending id).
pub(crate) async fn list_ids(
    executor: impl sqlx::PgExecutor<'_>,
    filter: QuestionFilter,
) -> Result<Vec<i64>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM questions");
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY id");

    builder.build_query_scalar::<i64>().fetch_all(executor).await
}

pub(crate) async fn list_page(
    pool: &PgPool,
    filter: QuestionFilter,
    skip: i64,
    limit: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM questions"));
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY id OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filter: QuestionFilter) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM questions");
    push_filter(&mut builder, filter);

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) text: &'a str,
    pub(crate) category_id: Option<i64>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) time_limit_seconds: Option<i32>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (text, category_id, difficulty, time_limit_seconds, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(params.text)
    .bind(params.category_id)
    .bind(params.difficulty)
    .bind(params.time_limit_seconds)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) struct UpdateQuestion {
    pub(crate) text: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) time_limit_seconds: Option<i32>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    params: UpdateQuestion,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            text = COALESCE($1, text),
            category_id = COALESCE($2, category_id),
            difficulty = COALESCE($3, difficulty),
            time_limit_seconds = COALESCE($4, time_limit_seconds)
         WHERE id = $5
         RETURNING {COLUMNS}"
    ))
    .bind(params.text)
    .bind(params.category_id)
    .bind(params.difficulty)
    .bind(params.time_limit_seconds)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
