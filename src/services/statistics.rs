use std::collections::BTreeMap;

use sqlx::PgConnection;
use time::PrimitiveDateTime;

use crate::core::state::AppState;
use crate::core::time::{iso_date, primitive_now_utc};
use crate::db::models::UserStatistics;
use crate::db::types::StatisticsPeriod;
use crate::repositories;
use crate::repositories::results::{CategorizedResultRow, TimedResultRow};
use crate::repositories::statistics::LeaderboardRow;
use crate::services::errors::QuizError;

/// What a finished attempt contributes to the running aggregate.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResultOutcome {
    pub(crate) score: f64,
    pub(crate) total_questions: i32,
    pub(crate) correct_answers: i32,
    pub(crate) time_spent: i32,
    pub(crate) completed_at: PrimitiveDateTime,
}

/// Folds one result into the aggregate; the average stays the exact mean of
/// every recorded score.
pub(crate) fn apply_result(stats: &mut UserStatistics, outcome: ResultOutcome) {
    let recorded = f64::from(stats.total_quizzes);
    stats.average_score = (stats.average_score * recorded + outcome.score) / (recorded + 1.0);
    stats.total_quizzes += 1;
    stats.total_questions_answered += outcome.total_questions;
    stats.correct_answers += outcome.correct_answers;
    stats.total_time_spent += outcome.time_spent;
    stats.last_quiz_date = Some(outcome.completed_at);
}

/// Updates the user's statistics row inside the caller's transaction. The
/// row stays locked until that transaction ends.
pub(crate) async fn record_result(
    conn: &mut PgConnection,
    user_id: &str,
    outcome: ResultOutcome,
) -> Result<UserStatistics, sqlx::Error> {
    repositories::statistics::ensure_row(&mut *conn, user_id).await?;
    let mut stats = repositories::statistics::lock_by_user(&mut *conn, user_id).await?;
    apply_result(&mut stats, outcome);
    repositories::statistics::save(&mut *conn, &stats).await?;
    Ok(stats)
}

pub(crate) async fn get_statistics(
    state: &AppState,
    user_id: &str,
) -> Result<UserStatistics, QuizError> {
    if let Some(stats) = repositories::statistics::find_by_user(state.db(), user_id).await? {
        return Ok(stats);
    }

    repositories::statistics::ensure_row(state.db(), user_id).await?;
    repositories::statistics::find_by_user(state.db(), user_id)
        .await?
        .ok_or_else(|| QuizError::not_found("User statistics"))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryStatistics {
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) total_quizzes: i32,
    pub(crate) total_questions_answered: i32,
    pub(crate) correct_answers: i32,
    pub(crate) average_score: f64,
    pub(crate) best_score: f64,
    pub(crate) worst_score: f64,
    pub(crate) total_time_spent: i32,
}

pub(crate) fn group_by_category(rows: Vec<CategorizedResultRow>) -> Vec<CategoryStatistics> {
    let mut groups: BTreeMap<(String, i64), CategoryStatistics> = BTreeMap::new();

    for row in rows {
        let entry = groups
            .entry((row.category_name.clone(), row.category_id))
            .or_insert_with(|| CategoryStatistics {
                category_id: row.category_id,
                category_name: row.category_name.clone(),
                total_quizzes: 0,
                total_questions_answered: 0,
                correct_answers: 0,
                average_score: 0.0,
                best_score: row.score,
                worst_score: row.score,
                total_time_spent: 0,
            });

        let recorded = f64::from(entry.total_quizzes);
        entry.average_score = (entry.average_score * recorded + row.score) / (recorded + 1.0);
        entry.total_quizzes += 1;
        entry.total_questions_answered += row.total_questions;
        entry.correct_answers += row.correct_answers;
        entry.total_time_spent += row.time_spent;
        entry.best_score = entry.best_score.max(row.score);
        entry.worst_score = entry.worst_score.min(row.score);
    }

    groups.into_values().collect()
}

pub(crate) async fn statistics_by_category(
    state: &AppState,
    user_id: &str,
) -> Result<Vec<CategoryStatistics>, QuizError> {
    let rows = repositories::results::list_categorized_for_user(state.db(), user_id).await?;
    Ok(group_by_category(rows))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PeriodStatistics {
    pub(crate) period: StatisticsPeriod,
    pub(crate) total_quizzes: i32,
    pub(crate) total_questions_answered: i32,
    pub(crate) correct_answers: i32,
    pub(crate) average_score: f64,
    pub(crate) total_time_spent: i32,
    pub(crate) quizzes_by_date: BTreeMap<String, i32>,
}

pub(crate) fn summarize_period(
    period: StatisticsPeriod,
    rows: &[TimedResultRow],
) -> PeriodStatistics {
    let mut summary = PeriodStatistics {
        period,
        total_quizzes: 0,
        total_questions_answered: 0,
        correct_answers: 0,
        average_score: 0.0,
        total_time_spent: 0,
        quizzes_by_date: BTreeMap::new(),
    };

    let mut score_sum = 0.0;
    for row in rows {
        summary.total_quizzes += 1;
        summary.total_questions_answered += row.total_questions;
        summary.correct_answers += row.correct_answers;
        summary.total_time_spent += row.time_spent;
        score_sum += row.score;
        *summary.quizzes_by_date.entry(iso_date(row.completed_at)).or_insert(0) += 1;
    }
    if summary.total_quizzes > 0 {
        summary.average_score = score_sum / f64::from(summary.total_quizzes);
    }

    summary
}

pub(crate) async fn statistics_by_period(
    state: &AppState,
    user_id: &str,
    period: StatisticsPeriod,
) -> Result<PeriodStatistics, QuizError> {
    let since = primitive_now_utc() - period.lookback();
    let rows = repositories::results::list_since_for_user(state.db(), user_id, since).await?;
    Ok(summarize_period(period, &rows))
}

/// `limit` is clamped to `1..=100`; `None` uses the configured default.
pub(crate) async fn leaderboard(
    state: &AppState,
    limit: Option<i64>,
) -> Result<Vec<LeaderboardRow>, QuizError> {
    let limit = limit.unwrap_or(state.settings().quiz().leaderboard_default_limit).clamp(1, 100);
    Ok(repositories::statistics::leaderboard(state.db(), limit).await?)
}
