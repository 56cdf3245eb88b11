// src/openapi.rs

use axum::{Json, response::IntoResponse};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{admin, generation, leaderboard, profile, quiz, rewards},
    models::{
        generation::{GenerateQuestionsRequest, GenerateQuestionsResponse, GenerationFailure},
        leaderboard::{LeaderboardPeriod, LeaderboardRow},
        profile::{MeResponse, Profile},
        question::{
            CreateQuestionRequest, NewQuestion, OptionView, PublicQuestion, Question,
            QuestionSource, QuestionStats, UpdateQuestionRequest,
        },
        quiz::{
            AnswerRequest, AnswerResponse, AttemptResult, CompleteRequest, QuizStatus,
            StartQuizResponse,
        },
        reward::{RedeemResponse, Redemption, RedemptionStatus, Reward, RewardType},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        quiz::get_status,
        quiz::start_quiz,
        quiz::answer_question,
        quiz::complete_quiz,
        leaderboard::get_leaderboard,
        profile::get_me,
        profile::list_my_rewards,
        rewards::list_rewards,
        rewards::redeem_reward,
        admin::question_stats,
        admin::create_question,
        admin::update_question,
        admin::reset_daily_counts,
        generation::generate_questions,
    ),
    components(schemas(
        QuizStatus,
        StartQuizResponse,
        AnswerRequest,
        AnswerResponse,
        CompleteRequest,
        AttemptResult,
        PublicQuestion,
        OptionView,
        Question,
        QuestionSource,
        NewQuestion,
        CreateQuestionRequest,
        UpdateQuestionRequest,
        QuestionStats,
        LeaderboardPeriod,
        LeaderboardRow,
        Profile,
        MeResponse,
        Reward,
        RewardType,
        Redemption,
        RedemptionStatus,
        RedeemResponse,
        GenerateQuestionsRequest,
        GenerateQuestionsResponse,
        GenerationFailure,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Quiz", description = "Daily quiz attempts"),
        (name = "Leaderboard", description = "Rankings"),
        (name = "Profile", description = "Current player"),
        (name = "Rewards", description = "Spending points"),
        (name = "Admin", description = "Question bank management")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
