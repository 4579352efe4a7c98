use sqlx::PgPool;

use crate::db::models::UserStatistics;

const COLUMNS: &str = "\
    user_id, total_quizzes, total_questions_answered, correct_answers, average_score, \
    total_time_spent, last_quiz_date";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct LeaderboardRow {
    pub(crate) username: String,
    pub(crate) total_quizzes: i32,
    pub(crate) average_score: f64,
    pub(crate) total_questions_answered: i32,
}

/// Inserts a zeroed row unless one exists.
pub(crate) async fn ensure_row(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO user_statistics (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn find_by_user(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
) -> Result<Option<UserStatistics>, sqlx::Error> {
    sqlx::query_as::<_, UserStatistics>(&format!(
        "SELECT {COLUMNS} FROM user_statistics WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Row-locks the user's statistics for a read-modify-write cycle.
pub(crate) async fn lock_by_user(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
) -> Result<UserStatistics, sqlx::Error> {
    sqlx::query_as::<_, UserStatistics>(&format!(
        "SELECT {COLUMNS} FROM user_statistics WHERE user_id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn save(
    executor: impl sqlx::PgExecutor<'_>,
    stats: &UserStatistics,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_statistics SET
            total_quizzes = $1,
            total_questions_answered = $2,
            correct_answers = $3,
            average_score = $4,
            total_time_spent = $5,
            last_quiz_date = $6
         WHERE user_id = $7",
    )
    .bind(stats.total_quizzes)
    .bind(stats.total_questions_answered)
    .bind(stats.correct_answers)
    .bind(stats.average_score)
    .bind(stats.total_time_spent)
    .bind(stats.last_quiz_date)
    .bind(&stats.user_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Users with at least one completed quiz, best average first.
pub(crate) async fn leaderboard(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardRow>(
        "SELECT u.username, s.total_quizzes, s.average_score, s.total_questions_answered
         FROM user_statistics s
         JOIN users u ON u.id = s.user_id
         WHERE s.total_quizzes > 0
         ORDER BY s.average_score DESC, s.total_quizzes DESC, u.username
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
