// src/models/generation.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::question::NewQuestion;

/// Body of a generation request. Both fields may be omitted.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct GenerateQuestionsRequest {
    pub count: Option<u32>,
    pub tags: Option<Vec<String>>,
}

/// Successful generation reply.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateQuestionsResponse {
    pub success: bool,
    pub message: String,
    pub questions: Vec<NewQuestion>,
}

/// Failed generation reply.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerationFailure {
    pub success: bool,
    pub error: String,
}
