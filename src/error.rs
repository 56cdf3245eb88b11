// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., reward out of stock)
    Conflict(String),

    /// The player has used every attempt for today.
    NoAttemptsRemaining,

    /// The active question set is empty.
    NoQuestionsAvailable,

    /// Writing the outcome of a finished attempt failed.
    /// Carries the underlying cause for the log only.
    PersistenceFailed(String),

    /// The model reply held no parsable question array.
    MalformedGenerationOutput(String),

    /// Storing a generated question failed. Carries the first line of the cause.
    GenerationInsertFailed(String),

    /// The text-generation API could not be reached or rejected the call.
    Upstream(String),
}

impl AppError {
    /// Message suitable for the client.
    pub fn message(&self) -> String {
        match self {
            AppError::InternalServerError(_) => "Internal Server Error".to_string(),
            AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::MalformedGenerationOutput(msg)
            | AppError::Upstream(msg) => msg.clone(),
            AppError::NoAttemptsRemaining => {
                "No attempts left today. Come back tomorrow for more quiz attempts!".to_string()
            }
            AppError::NoQuestionsAvailable => {
                "No questions available right now. Please try again later.".to_string()
            }
            AppError::PersistenceFailed(_) => "Failed to save results".to_string(),
            AppError::GenerationInsertFailed(cause) => {
                format!("Error inserting question: {}", cause)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_)
            | AppError::PersistenceFailed(_)
            | AppError::MalformedGenerationOutput(_)
            | AppError::GenerationInsertFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::NoAttemptsRemaining => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::NoQuestionsAvailable => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg) | AppError::PersistenceFailed(msg) => {
                write!(f, "{}", msg)
            }
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
            }
            AppError::PersistenceFailed(msg) => {
                tracing::error!("Failed to persist quiz attempt: {}", msg);
            }
            _ => {}
        }

        let body = Json(json!({
            "error": self.message(),
        }));

        (self.status(), body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
