// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, generation, leaderboard, profile, quiz, rewards},
    openapi::openapi_json,
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quiz, leaderboard, profile, rewards, admin).
/// * Applies global middleware (Trace, CORS).
/// * The generation endpoint sits outside the restricted CORS policy and
///   answers preflight requests from any origin.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let generation_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    let auth = middleware::from_fn_with_state(state.config.clone(), auth_middleware);

    let quiz_routes = Router::new()
        .route("/status", get(quiz::get_status))
        .route("/start", post(quiz::start_quiz))
        .route("/answer", post(quiz::answer_question))
        .route("/complete", post(quiz::complete_quiz))
        .route_layer(auth.clone());

    let profile_routes = Router::new()
        .route("/me", get(profile::get_me))
        .route("/rewards", get(profile::list_my_rewards))
        .route_layer(auth.clone());

    let reward_routes = Router::new()
        .route("/", get(rewards::list_rewards))
        // Protected reward routes
        .merge(
            Router::new()
                .route("/{id}/redeem", post(rewards::redeem_reward))
                .route_layer(auth.clone()),
        );

    let admin_routes = Router::new()
        .route("/questions/stats", get(admin::question_stats))
        .route("/questions", post(admin::create_question))
        .route("/questions/{id}", put(admin::update_question))
        .route("/profiles/reset-daily", post(admin::reset_daily_counts))
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(auth.clone());

    // Outermost first: preflight is answered before the token check.
    // route_layer keeps unmatched paths out of auth so they still 404.
    let generation_routes = Router::new()
        .route(
            "/api/admin/questions/generate",
            post(generation::generate_questions),
        )
        .route_layer(
            ServiceBuilder::new()
                .layer(generation_cors)
                .layer(auth)
                .layer(middleware::from_fn(admin_middleware)),
        );

    let api = Router::new()
        .nest("/api/quiz", quiz_routes)
        .route("/api/leaderboard", get(leaderboard::get_leaderboard))
        .nest("/api/profile", profile_routes)
        .nest("/api/rewards", reward_routes)
        .nest("/api/admin", admin_routes)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(cors);

    Router::new()
        .merge(api)
        .merge(generation_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
