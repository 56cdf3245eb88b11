// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        CreateQuestionRequest, NewQuestion, Question, QuestionSource, QuestionStats,
        UpdateQuestionRequest,
    },
    store::SharedStore,
};

/// Question counts by source.
/// Admin only.
#[utoipa::path(
    get,
    path = "/api/admin/questions/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Question counts", body = QuestionStats),
        (status = 403, description = "Forbidden")
    ),
    security(("jwt" = []))
)]
pub async fn question_stats(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    let stats = store.question_stats().await?;
    Ok(Json(stats))
}

/// Creates a question by hand.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/questions",
    tag = "Admin",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Invalid question")
    ),
    security(("jwt" = []))
)]
pub async fn create_question(
    State(store): State<SharedStore>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = NewQuestion::from(payload).normalized();
    question.check()?;

    let created = store.insert_question(question, QuestionSource::Manual).await?;
    tracing::info!(question_id = %created.id, "Question created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Updates a question. Only present fields change.
/// Admin only.
#[utoipa::path(
    put,
    path = "/api/admin/questions/{id}",
    tag = "Admin",
    request_body = UpdateQuestionRequest,
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 400, description = "Invalid question"),
        (status = 404, description = "Question not found")
    ),
    security(("jwt" = []))
)]
pub async fn update_question(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let existing = store
        .get_question(id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let updated = payload.apply(existing)?;
    store.update_question(&updated).await?;
    tracing::info!(question_id = %id, is_active = updated.is_active, "Question updated");

    Ok(Json(updated))
}

/// Zeroes every player's daily attempt count now.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/profiles/reset-daily",
    tag = "Admin",
    responses(
        (status = 200, description = "Number of profiles reset")
    ),
    security(("jwt" = []))
)]
pub async fn reset_daily_counts(
    State(store): State<SharedStore>,
) -> Result<impl IntoResponse, AppError> {
    let reset = store.reset_daily_counts().await?;
    tracing::info!(profiles = reset, "Daily attempt counts reset by admin");
    Ok(Json(json!({ "reset": reset })))
}
