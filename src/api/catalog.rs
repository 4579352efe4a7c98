use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{clamp_page, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Answer, Question};
use crate::db::types::DifficultyLevel;
use crate::repositories;
use crate::repositories::questions::QuestionFilter;
use crate::schemas::catalog::{
    AnswerCreate, AnswerResponse, AnswerUpdate, CategoryCreate, CategoryResponse, CategoryUpdate,
    QuestionCreate, QuestionResponse, QuestionUpdate,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuestionsQuery {
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    limit: i64,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:category_id",
            get(get_category).patch(update_category).delete(delete_category),
        )
        .route("/questions", get(list_questions).post(create_question))
        .route(
            "/questions/:question_id",
            get(get_question).patch(update_question).delete(delete_question),
        )
        .route("/questions/:question_id/answers", post(add_answer))
        .route("/answers/:answer_id", patch(update_answer).delete(delete_answer))
}

async fn list_categories(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = repositories::categories::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list categories"))?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from_db).collect()))
}

async fn get_category(
    Path(category_id): Path<i64>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = repositories::categories::find_by_id(state.db(), category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(CategoryResponse::from_db(category)))
}

async fn create_category(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    ensure_category_name_free(&state, &payload.name, None).await?;

    let category = repositories::categories::create(
        state.db(),
        &payload.name,
        payload.description.as_deref(),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create category"))?;

    tracing::info!(category_id = category.id, admin_id = %admin.id, "Category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse::from_db(category))))
}

async fn update_category(
    Path(category_id): Path<i64>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if let Some(name) = payload.name.as_deref() {
        ensure_category_name_free(&state, name, Some(category_id)).await?;
    }

    let category = repositories::categories::update(
        state.db(),
        category_id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update category"))?
    .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(CategoryResponse::from_db(category)))
}

async fn delete_category(
    Path(category_id): Path<i64>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::categories::delete(state.db(), category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete category"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Category not found".to_string()))
    }
}

async fn list_questions(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListQuestionsQuery>,
) -> Result<Json<PaginatedResponse<QuestionResponse>>, ApiError> {
    let (skip, limit) = clamp_page(params.skip, params.limit);
    let difficulty = params
        .difficulty
        .as_deref()
        .map(str::parse::<DifficultyLevel>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let filter = QuestionFilter { category_id: params.category_id, difficulty };

    let total_count = repositories::questions::count(state.db(), filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
    let questions = repositories::questions::list_page(state.db(), filter, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    let question_ids: Vec<i64> = questions.iter().map(|question| question.id).collect();
    let answers = repositories::answers::list_by_questions(state.db(), &question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    let items = attach_answers(questions, answers, user.is_admin);
    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

async fn get_question(
    Path(question_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = fetch_question(&state, question_id).await?;
    let answers = repositories::answers::list_by_question(state.db(), question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    Ok(Json(question_response(question, answers, user.is_admin)))
}

async fn create_question(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let question = repositories::questions::create(
        &mut *tx,
        repositories::questions::CreateQuestion {
            text: &payload.text,
            category_id: payload.category_id,
            difficulty: payload.difficulty,
            time_limit_seconds: payload.time_limit_seconds,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    let mut answers = Vec::with_capacity(payload.answers.len());
    for answer in &payload.answers {
        let created =
            repositories::answers::create(&mut *tx, question.id, &answer.text, answer.is_correct)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;
        answers.push(created);
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        question_id = question.id,
        answers = answers.len(),
        admin_id = %admin.id,
        "Question created"
    );
    Ok((StatusCode::CREATED, Json(question_response(question, answers, true))))
}

async fn update_question(
    Path(question_id): Path<i64>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state, category_id).await?;
    }

    let question = repositories::questions::update(
        state.db(),
        question_id,
        repositories::questions::UpdateQuestion {
            text: payload.text,
            category_id: payload.category_id,
            difficulty: payload.difficulty,
            time_limit_seconds: payload.time_limit_seconds,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?
    .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    let answers = repositories::answers::list_by_question(state.db(), question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    Ok(Json(question_response(question, answers, true)))
}

async fn delete_question(
    Path(question_id): Path<i64>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::questions::delete(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Question not found".to_string()))
    }
}

async fn add_answer(
    Path(question_id): Path<i64>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AnswerCreate>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let question = fetch_question(&state, question_id).await?;

    let answer =
        repositories::answers::create(state.db(), question.id, &payload.text, payload.is_correct)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer, true))))
}

async fn update_answer(
    Path(answer_id): Path<i64>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AnswerUpdate>,
) -> Result<Json<AnswerResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let answer = repositories::answers::update(
        state.db(),
        answer_id,
        payload.text.as_deref(),
        payload.is_correct,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update answer"))?
    .ok_or_else(|| ApiError::NotFound("Answer not found".to_string()))?;

    Ok(Json(AnswerResponse::from_db(answer, true)))
}

async fn delete_answer(
    Path(answer_id): Path<i64>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::answers::delete(state.db(), answer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete answer"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Answer not found".to_string()))
    }
}

async fn fetch_question(state: &AppState, question_id: i64) -> Result<Question, ApiError> {
    repositories::questions::find_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

async fn ensure_category_exists(state: &AppState, category_id: i64) -> Result<(), ApiError> {
    repositories::categories::find_by_id(state.db(), category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
}

async fn ensure_category_name_free(
    state: &AppState,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<(), ApiError> {
    let taken = repositories::categories::exists_by_name(state.db(), name, exclude_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check category name"))?;
    if taken {
        Err(ApiError::Conflict(format!("Category '{name}' already exists")))
    } else {
        Ok(())
    }
}

fn question_response(question: Question, answers: Vec<Answer>, reveal: bool) -> QuestionResponse {
    let answers = answers.into_iter().map(|answer| AnswerResponse::from_db(answer, reveal)).collect();
    QuestionResponse::from_db(question, answers)
}

fn attach_answers(
    questions: Vec<Question>,
    answers: Vec<Answer>,
    reveal: bool,
) -> Vec<QuestionResponse> {
    let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
    for answer in answers {
        by_question.entry(answer.question_id).or_default().push(answer);
    }

    questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            question_response(question, answers, reveal)
        })
        .collect()
}

#[cfg(test)]
mod tests;
