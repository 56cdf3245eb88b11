// src/handlers/quiz.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    error::AppError,
    models::quiz::{
        AnswerRequest, AnswerResponse, AttemptResult, CompleteRequest, QuizStatus,
        StartQuizResponse,
    },
    services::attempt::AttemptService,
    utils::jwt::Claims,
};

/// Remaining attempts and points of the current player.
#[utoipa::path(
    get,
    path = "/api/quiz/status",
    tag = "Quiz",
    responses(
        (status = 200, description = "Attempt allowance", body = QuizStatus),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("jwt" = []))
)]
pub async fn get_status(
    State(attempts): State<AttemptService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let status = attempts.status(claims.player()?).await?;
    Ok(Json(status))
}

/// Starts a quiz attempt.
///
/// Serves up to five random active questions without their answers.
#[utoipa::path(
    post,
    path = "/api/quiz/start",
    tag = "Quiz",
    responses(
        (status = 200, description = "Attempt started", body = StartQuizResponse),
        (status = 403, description = "No attempts left today"),
        (status = 404, description = "No questions available")
    ),
    security(("jwt" = []))
)]
pub async fn start_quiz(
    State(attempts): State<AttemptService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let started = attempts.start(claims.player()?, Utc::now()).await?;
    Ok(Json(started))
}

/// Answers the current question of a session.
#[utoipa::path(
    post,
    path = "/api/quiz/answer",
    tag = "Quiz",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer graded", body = AnswerResponse),
        (status = 400, description = "Option does not exist"),
        (status = 404, description = "Session not found or expired"),
        (status = 409, description = "Quiz already completed")
    ),
    security(("jwt" = []))
)]
pub async fn answer_question(
    State(attempts): State<AttemptService>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let graded = attempts.answer(
        claims.player()?,
        payload.session_id,
        payload.selected,
        Utc::now(),
    )?;
    Ok(Json(graded))
}

/// Records a finished attempt and returns the outcome.
#[utoipa::path(
    post,
    path = "/api/quiz/complete",
    tag = "Quiz",
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Attempt recorded", body = AttemptResult),
        (status = 403, description = "No attempts left today"),
        (status = 409, description = "Questions remain unanswered"),
        (status = 500, description = "Failed to save results")
    ),
    security(("jwt" = []))
)]
pub async fn complete_quiz(
    State(attempts): State<AttemptService>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = attempts
        .complete(claims.player()?, payload.session_id, Utc::now())
        .await?;
    Ok(Json(result))
}
