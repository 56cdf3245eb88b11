// src/store/mod.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        leaderboard::{LeaderboardEntry, LeaderboardRow},
        profile::Profile,
        question::{NewQuestion, Question, QuestionSource, QuestionStats},
        reward::{RedeemResponse, Redemption, Reward},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence contract for questions, profiles, the leaderboard and rewards.
///
/// Each method is a single independent write or read; callers that need
/// several of them get no atomicity across calls. `redeem_reward` is the one
/// exception and must apply all of its changes or none.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Up to `limit` questions with the active flag set.
    async fn fetch_active_questions(&self, limit: i64) -> Result<Vec<Question>, AppError>;

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, AppError>;

    async fn insert_question(
        &self,
        question: NewQuestion,
        source: QuestionSource,
    ) -> Result<Question, AppError>;

    /// Overwrites every mutable column of an existing question.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no row has `question.id`.
    async fn update_question(&self, question: &Question) -> Result<(), AppError>;

    async fn question_stats(&self) -> Result<QuestionStats, AppError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Adds one used attempt and `score` points, stamps `last_active_at`,
    /// and returns the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the profile does not exist.
    async fn record_attempt(
        &self,
        user_id: Uuid,
        score: i32,
        at: DateTime<Utc>,
    ) -> Result<Profile, AppError>;

    /// Inserts the row for (user, date) or overwrites it.
    async fn upsert_leaderboard(&self, entry: &LeaderboardEntry) -> Result<(), AppError>;

    /// Sets every profile's daily attempt count back to zero.
    async fn reset_daily_counts(&self) -> Result<u64, AppError>;

    async fn daily_leaderboard(
        &self,
        date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, AppError>;

    /// Sums daily scores over the inclusive range `from..=to`.
    async fn ranged_leaderboard(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, AppError>;

    async fn all_time_leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardRow>, AppError>;

    async fn list_active_rewards(&self) -> Result<Vec<Reward>, AppError>;

    async fn get_reward(&self, id: Uuid) -> Result<Option<Reward>, AppError>;

    /// Spends the reward's cost from the player's points, takes one item
    /// from stock and records a pending redemption.
    ///
    /// # Errors
    ///
    /// * `NotFound` if the reward is missing or inactive, or the profile is missing.
    /// * `Conflict` if the reward is out of stock.
    /// * `BadRequest` if the player cannot afford it.
    async fn redeem_reward(
        &self,
        user_id: Uuid,
        reward_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<RedeemResponse, AppError>;

    /// Redemptions of a player, newest first.
    async fn list_redemptions(&self, user_id: Uuid) -> Result<Vec<Redemption>, AppError>;
}

pub type SharedStore = Arc<dyn QuizStore>;
