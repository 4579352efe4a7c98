use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::{clamp_page, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::types::StatisticsPeriod;
use crate::repositories;
use crate::schemas::attempt::{
    AnswerSubmit, AnswerSubmitResponse, AttemptCreate, AttemptResponse, QuizResultResponse,
    ReviewItemResponse,
};
use crate::schemas::statistics::{
    CategoryStatisticsResponse, DatePeriodStatisticsResponse, LeaderboardEntry, LeaderboardQuery,
    PeriodQuery, UserStatisticsResponse,
};
use crate::services::{attempt_builder, scoring, statistics};

#[derive(Debug, Deserialize)]
pub(crate) struct ListAttemptsQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: i64,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/attempts", post(start_attempt).get(list_attempts))
        .route("/attempts/:attempt_id", get(get_attempt))
        .route("/attempts/:attempt_id/complete", post(complete_attempt))
        .route("/attempts/:attempt_id/review", get(review_attempt))
        .route("/answers", post(submit_answer))
        .route("/statistics/me", get(my_statistics))
        .route("/statistics/me/categories", get(my_category_statistics))
        .route("/statistics/me/period", get(my_period_statistics))
        .route("/leaderboard", get(leaderboard))
}

async fn start_attempt(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AttemptCreate>,
) -> Result<(StatusCode, Json<AttemptResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let filters = payload.into_filters()?;
    let attempt = attempt_builder::start_attempt(&state, &user.id, filters).await?;

    Ok((StatusCode::CREATED, Json(AttemptResponse::from_db(attempt))))
}

async fn list_attempts(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListAttemptsQuery>,
) -> Result<Json<PaginatedResponse<AttemptResponse>>, ApiError> {
    let (skip, limit) = clamp_page(params.skip, params.limit);

    let total_count = repositories::attempts::count_by_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count attempts"))?;
    let attempts = repositories::attempts::list_by_user(state.db(), &user.id, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    let items = attempts.into_iter().map(AttemptResponse::from_db).collect();
    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

async fn get_attempt(
    Path(attempt_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = repositories::attempts::find_for_user(state.db(), attempt_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("Quiz attempt not found".to_string()))?;

    Ok(Json(AttemptResponse::from_db(attempt)))
}

async fn complete_attempt(
    Path(attempt_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuizResultResponse>, ApiError> {
    let completed = scoring::complete_attempt(&state, attempt_id, &user.id).await?;

    Ok(Json(QuizResultResponse::from_db(completed.result, completed.time_spent)))
}

async fn review_attempt(
    Path(attempt_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewItemResponse>>, ApiError> {
    let entries = scoring::review_attempt(&state, attempt_id, &user.id).await?;

    Ok(Json(entries.into_iter().map(ReviewItemResponse::from).collect()))
}

async fn submit_answer(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AnswerSubmit>,
) -> Result<(StatusCode, Json<AnswerSubmitResponse>), ApiError> {
    repositories::questions::find_by_id(state.db(), payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let answer = repositories::answers::find_by_id(state.db(), payload.answer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answer"))?
        .filter(|answer| answer.question_id == payload.question_id)
        .ok_or_else(|| ApiError::NotFound("Answer not found for this question".to_string()))?;

    let submission = repositories::user_answers::create(
        state.db(),
        &user.id,
        payload.question_id,
        answer.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to record answer"))?;

    Ok((
        StatusCode::CREATED,
        Json(AnswerSubmitResponse {
            id: submission.id,
            question_id: submission.question_id,
            answer_id: submission.answer_id,
            answered_at: format_primitive(submission.answered_at),
        }),
    ))
}

async fn my_statistics(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UserStatisticsResponse>, ApiError> {
    let stats = statistics::get_statistics(&state, &user.id).await?;
    Ok(Json(UserStatisticsResponse::from_db(stats)))
}

async fn my_category_statistics(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryStatisticsResponse>>, ApiError> {
    let groups = statistics::statistics_by_category(&state, &user.id).await?;
    Ok(Json(groups.into_iter().map(CategoryStatisticsResponse::from).collect()))
}

async fn my_period_statistics(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<DatePeriodStatisticsResponse>, ApiError> {
    let period = match params.period.as_deref() {
        None => StatisticsPeriod::Week,
        Some(raw) => raw.parse::<StatisticsPeriod>().map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };

    let summary = statistics::statistics_by_period(&state, &user.id, period).await?;
    Ok(Json(summary.into()))
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let rows = statistics::leaderboard(&state, params.limit).await?;
    Ok(Json(rows.into_iter().map(LeaderboardEntry::from).collect()))
}
