// src/models/leaderboard.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Represents the 'leaderboard' table in the database.
/// At most one row exists per (user_id, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub date: NaiveDate,
    /// Score of the latest attempt recorded that day.
    pub daily_score: i32,
    /// Player's running point total after that attempt.
    pub total_score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardPeriod {
    #[default]
    Daily,
    Weekly,
    AllTime,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    pub period: Option<LeaderboardPeriod>,
    /// Day the ranking is anchored to (defaults to today, UTC).
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

/// Aggregated row for displaying a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardRow {
    pub rank: i64,
    pub user_id: Uuid,
    pub name: String,
    pub score: i64,
}

/// Assigns 1-based ranks to rows already sorted best first.
pub fn ranked(rows: Vec<(Uuid, String, i64)>) -> Vec<LeaderboardRow> {
    rows.into_iter()
        .enumerate()
        .map(|(i, (user_id, name, score))| LeaderboardRow {
            rank: i as i64 + 1,
            user_id,
            name,
            score,
        })
        .collect()
}
