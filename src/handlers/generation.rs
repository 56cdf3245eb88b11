// src/handlers/generation.rs

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    models::{
        generation::{GenerateQuestionsRequest, GenerateQuestionsResponse, GenerationFailure},
        question::NewQuestion,
    },
    services::generation::QuestionGenerator,
};

/// Generates questions with the language model and stores them.
///
/// Replies with its own envelope: `success: true` with the stored
/// questions, or `success: false` with the error message and status 500.
/// An empty body means defaults.
/// Admin only.
#[utoipa::path(
    post,
    path = "/api/admin/questions/generate",
    tag = "Admin",
    request_body = GenerateQuestionsRequest,
    responses(
        (status = 200, description = "Questions generated and stored", body = GenerateQuestionsResponse),
        (status = 500, description = "Generation failed", body = GenerationFailure)
    ),
    security(("jwt" = []))
)]
pub async fn generate_questions(
    State(generator): State<QuestionGenerator>,
    body: Bytes,
) -> Response {
    match run(&generator, &body).await {
        Ok(questions) => Json(GenerateQuestionsResponse {
            success: true,
            message: format!(
                "Successfully generated and stored {} quiz questions",
                questions.len()
            ),
            questions,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Question generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerationFailure {
                    success: false,
                    error: e.message(),
                }),
            )
                .into_response()
        }
    }
}

async fn run(generator: &QuestionGenerator, body: &[u8]) -> Result<Vec<NewQuestion>, AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateQuestionsRequest::default()
    } else {
        serde_json::from_slice::<GenerateQuestionsRequest>(body)?
    };
    generator.generate(request).await
}
