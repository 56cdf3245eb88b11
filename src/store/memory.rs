// src/store/memory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        leaderboard::{LeaderboardEntry, LeaderboardRow, ranked},
        profile::Profile,
        question::{NewQuestion, Question, QuestionSource, QuestionStats},
        reward::{RedeemResponse, Redemption, RedemptionStatus, Reward},
    },
    store::QuizStore,
};

#[derive(Default)]
struct Inner {
    /// Insertion order is kept so reads are deterministic.
    questions: Vec<Question>,
    profiles: HashMap<Uuid, Profile>,
    leaderboard: HashMap<(Uuid, NaiveDate), LeaderboardEntry>,
    rewards: Vec<Reward>,
    redemptions: Vec<(Uuid, Redemption)>,
    /// When set, every question insert after this many succeeds fails.
    fail_inserts_after: Option<usize>,
    fail_profile_writes: bool,
}

/// In-memory `QuizStore` for tests and local prototyping.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    /// Seeds or replaces a profile.
    pub fn put_profile(&self, profile: Profile) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.profiles.insert(profile.id, profile);
        }
    }

    /// Seeds a question as-is, bypassing shape checks.
    pub fn put_question(&self, question: Question) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.questions.push(question);
        }
    }

    pub fn put_reward(&self, reward: Reward) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.rewards.push(reward);
        }
    }

    /// Makes question inserts fail once `n` more have succeeded.
    pub fn fail_inserts_after(&self, n: usize) {
        if let Ok(mut inner) = self.inner.lock() {
            let existing = inner.questions.len();
            inner.fail_inserts_after = Some(existing + n);
        }
    }

    /// Makes `record_attempt` fail.
    pub fn fail_profile_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_profile_writes = fail;
        }
    }

    pub fn questions(&self) -> Vec<Question> {
        self.inner
            .lock()
            .map(|inner| inner.questions.clone())
            .unwrap_or_default()
    }

    pub fn leaderboard_entries(&self) -> Vec<LeaderboardEntry> {
        self.inner
            .lock()
            .map(|inner| inner.leaderboard.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn sorted_rows(mut rows: Vec<(Uuid, String, i64)>, limit: i64) -> Vec<LeaderboardRow> {
    rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    rows.truncate(limit.max(0) as usize);
    ranked(rows)
}

fn name_of(inner: &Inner, user_id: &Uuid) -> String {
    inner
        .profiles
        .get(user_id)
        .map(|p| p.display_name())
        .unwrap_or_else(|| "Anonymous".to_string())
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn fetch_active_questions(&self, limit: i64) -> Result<Vec<Question>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .questions
            .iter()
            .filter(|q| q.is_active)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
        let inner = self.lock()?;
        Ok(inner.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn insert_question(
        &self,
        question: NewQuestion,
        source: QuestionSource,
    ) -> Result<Question, AppError> {
        let mut inner = self.lock()?;
        if let Some(limit) = inner.fail_inserts_after {
            if inner.questions.len() >= limit {
                return Err(AppError::InternalServerError(
                    "insert rejected by store".to_string(),
                ));
            }
        }

        let stored = Question {
            id: Uuid::new_v4(),
            question_text: question.question_text,
            options: question.options,
            correct_option: question.correct_option,
            tags: question.tags,
            is_active: true,
            source,
            created_at: Utc::now(),
        };
        inner.questions.push(stored.clone());
        Ok(stored)
    }

    async fn update_question(&self, question: &Question) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        let slot = inner
            .questions
            .iter_mut()
            .find(|q| q.id == question.id)
            .ok_or(AppError::NotFound("Question not found".to_string()))?;
        *slot = question.clone();
        Ok(())
    }

    async fn question_stats(&self) -> Result<QuestionStats, AppError> {
        let inner = self.lock()?;
        let total = inner.questions.len() as i64;
        let ai_generated = inner
            .questions
            .iter()
            .filter(|q| q.source == QuestionSource::Ai)
            .count() as i64;
        Ok(QuestionStats {
            total,
            ai_generated,
            manually_created: total - ai_generated,
        })
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let inner = self.lock()?;
        Ok(inner.profiles.get(&user_id).cloned())
    }

    async fn record_attempt(
        &self,
        user_id: Uuid,
        score: i32,
        at: DateTime<Utc>,
    ) -> Result<Profile, AppError> {
        let mut inner = self.lock()?;
        if inner.fail_profile_writes {
            return Err(AppError::InternalServerError(
                "profile write rejected by store".to_string(),
            ));
        }
        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or(AppError::NotFound("Profile not found".to_string()))?;
        profile.daily_quiz_count += 1;
        profile.total_points += score;
        profile.last_active_at = Some(at);
        Ok(profile.clone())
    }

    async fn upsert_leaderboard(&self, entry: &LeaderboardEntry) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        inner
            .leaderboard
            .insert((entry.user_id, entry.date), entry.clone());
        Ok(())
    }

    async fn reset_daily_counts(&self) -> Result<u64, AppError> {
        let mut inner = self.lock()?;
        let mut touched = 0;
        for profile in inner.profiles.values_mut() {
            if profile.daily_quiz_count != 0 {
                profile.daily_quiz_count = 0;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn daily_leaderboard(
        &self,
        date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, AppError> {
        let inner = self.lock()?;
        let rows = inner
            .leaderboard
            .values()
            .filter(|e| e.date == date && inner.profiles.contains_key(&e.user_id))
            .map(|e| (e.user_id, name_of(&inner, &e.user_id), e.daily_score as i64))
            .collect();
        Ok(sorted_rows(rows, limit))
    }

    async fn ranged_leaderboard(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, AppError> {
        let inner = self.lock()?;
        let mut sums: HashMap<Uuid, i64> = HashMap::new();
        for entry in inner.leaderboard.values() {
            if entry.date >= from && entry.date <= to && inner.profiles.contains_key(&entry.user_id)
            {
                *sums.entry(entry.user_id).or_default() += entry.daily_score as i64;
            }
        }
        let rows = sums
            .into_iter()
            .map(|(user_id, score)| (user_id, name_of(&inner, &user_id), score))
            .collect();
        Ok(sorted_rows(rows, limit))
    }

    async fn all_time_leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardRow>, AppError> {
        let inner = self.lock()?;
        let rows = inner
            .profiles
            .values()
            .map(|p| (p.id, p.display_name(), p.total_points as i64))
            .collect();
        Ok(sorted_rows(rows, limit))
    }

    async fn list_active_rewards(&self) -> Result<Vec<Reward>, AppError> {
        let inner = self.lock()?;
        let mut rewards: Vec<Reward> = inner.rewards.iter().filter(|r| r.is_active).cloned().collect();
        rewards.sort_by_key(|r| r.points_required);
        Ok(rewards)
    }

    async fn get_reward(&self, id: Uuid) -> Result<Option<Reward>, AppError> {
        let inner = self.lock()?;
        Ok(inner.rewards.iter().find(|r| r.id == id).cloned())
    }

    async fn redeem_reward(
        &self,
        user_id: Uuid,
        reward_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<RedeemResponse, AppError> {
        let mut inner = self.lock()?;

        let reward = inner
            .rewards
            .iter()
            .find(|r| r.id == reward_id && r.is_active)
            .cloned()
            .ok_or(AppError::NotFound("Reward not found".to_string()))?;

        if reward.stock <= 0 {
            return Err(AppError::Conflict("Reward is out of stock".to_string()));
        }

        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or(AppError::NotFound("Profile not found".to_string()))?;

        if profile.total_points < reward.points_required {
            return Err(AppError::BadRequest(
                "Not enough points to redeem this reward".to_string(),
            ));
        }
        profile.total_points -= reward.points_required;
        let remaining_points = profile.total_points;

        if let Some(stored) = inner.rewards.iter_mut().find(|r| r.id == reward_id) {
            stored.stock -= 1;
        }

        let redemption = Redemption {
            id: Uuid::new_v4(),
            reward_id,
            reward_name: reward.name,
            points_spent: reward.points_required,
            status: RedemptionStatus::Pending,
            redeemed_at: at,
        };
        inner.redemptions.push((user_id, redemption.clone()));

        Ok(RedeemResponse {
            redemption,
            remaining_points,
        })
    }

    async fn list_redemptions(&self, user_id: Uuid) -> Result<Vec<Redemption>, AppError> {
        let inner = self.lock()?;
        let mut list: Vec<Redemption> = inner
            .redemptions
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, r)| r.clone())
            .collect();
        list.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        Ok(list)
    }
}
