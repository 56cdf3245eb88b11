// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{Days, Utc};

use crate::{
    error::AppError,
    models::leaderboard::{LeaderboardParams, LeaderboardPeriod, LeaderboardRow},
    store::SharedStore,
};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Ranks players for a day, the week ending on that day, or all time.
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "Leaderboard",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Ranking, best first", body = Vec<LeaderboardRow>),
        (status = 400, description = "Invalid query")
    )
)]
pub async fn get_leaderboard(
    State(store): State<SharedStore>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let rows = match params.period.unwrap_or_default() {
        LeaderboardPeriod::Daily => store.daily_leaderboard(date, limit).await?,
        LeaderboardPeriod::Weekly => {
            let from = date
                .checked_sub_days(Days::new(6))
                .ok_or_else(|| AppError::BadRequest("Date out of range".to_string()))?;
            store.ranged_leaderboard(from, date, limit).await?
        }
        LeaderboardPeriod::AllTime => store.all_time_leaderboard(limit).await?,
    };

    Ok(Json(rows))
}
