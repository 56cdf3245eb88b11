// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::question::PublicQuestion;

/// Attempt allowance of the current player.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuizStatus {
    pub attempts_remaining: i32,
    pub daily_attempt_limit: i32,
    pub total_points: i32,
}

/// DTO returned when a quiz attempt starts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartQuizResponse {
    pub session_id: Uuid,
    pub questions: Vec<PublicQuestion>,
    pub total_questions: usize,
    pub attempts_remaining: i32,
}

/// DTO for answering the current question of a session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AnswerRequest {
    pub session_id: Uuid,
    /// Index of the chosen option, in letter order (a = 0).
    pub selected: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnswerResponse {
    pub question_id: Uuid,
    pub correct: bool,
    pub correct_index: Option<usize>,
    pub correct_count: u32,
    /// Index of the next question to answer, or the total when completed.
    pub current_index: usize,
    pub total_questions: usize,
    pub completed: bool,
}

/// DTO for recording a finished session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CompleteRequest {
    pub session_id: Uuid,
}

/// Outcome of a recorded attempt.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttemptResult {
    pub score: i32,
    pub correct_count: u32,
    pub total_questions: usize,
    pub perfect_bonus: bool,
    pub total_points: i32,
    pub daily_quiz_count: i32,
    pub attempts_remaining: i32,
}
