// src/store/postgres.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        leaderboard::{LeaderboardEntry, LeaderboardRow, ranked},
        profile::Profile,
        question::{NewQuestion, Question, QuestionSource, QuestionStats},
        reward::{RedeemResponse, Redemption, RedemptionStatus, Reward, RewardType},
    },
    store::QuizStore,
};

const QUESTION_COLUMNS: &str =
    "id, question_text, options, correct_option, tags, is_active, source, created_at";

const PROFILE_COLUMNS: &str =
    "id, name, email, total_points, daily_quiz_count, last_active_at, created_at";

const REWARD_COLUMNS: &str = "id, name, reward_type, points_required, stock, image_url, is_active";

/// Raw shape of a 'quiz_questions' row.
#[derive(FromRow)]
struct QuestionRow {
    id: Uuid,
    question_text: String,
    options: Json<BTreeMap<String, String>>,
    correct_option: String,
    tags: Vec<String>,
    is_active: bool,
    source: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let source = QuestionSource::parse(&row.source).ok_or_else(|| {
            AppError::InternalServerError(format!("Unknown question source '{}'", row.source))
        })?;

        Ok(Question {
            id: row.id,
            question_text: row.question_text,
            options: row.options.0,
            correct_option: row.correct_option,
            tags: row.tags,
            is_active: row.is_active,
            source,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    name: Option<String>,
    email: Option<String>,
    total_points: i32,
    daily_quiz_count: i32,
    last_active_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            name: row.name,
            email: row.email,
            total_points: row.total_points,
            daily_quiz_count: row.daily_quiz_count,
            last_active_at: row.last_active_at,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct RewardRow {
    id: Uuid,
    name: String,
    reward_type: String,
    points_required: i32,
    stock: i32,
    image_url: Option<String>,
    is_active: bool,
}

impl TryFrom<RewardRow> for Reward {
    type Error = AppError;

    fn try_from(row: RewardRow) -> Result<Self, Self::Error> {
        let reward_type = RewardType::parse(&row.reward_type).ok_or_else(|| {
            AppError::InternalServerError(format!("Unknown reward type '{}'", row.reward_type))
        })?;

        Ok(Reward {
            id: row.id,
            name: row.name,
            reward_type,
            points_required: row.points_required,
            stock: row.stock,
            image_url: row.image_url,
            is_active: row.is_active,
        })
    }
}

#[derive(FromRow)]
struct RedemptionRow {
    id: Uuid,
    reward_id: Uuid,
    reward_name: String,
    points_spent: i32,
    status: String,
    redeemed_at: DateTime<Utc>,
}

impl TryFrom<RedemptionRow> for Redemption {
    type Error = AppError;

    fn try_from(row: RedemptionRow) -> Result<Self, Self::Error> {
        let status = RedemptionStatus::parse(&row.status).ok_or_else(|| {
            AppError::InternalServerError(format!("Unknown redemption status '{}'", row.status))
        })?;

        Ok(Redemption {
            id: row.id,
            reward_id: row.reward_id,
            reward_name: row.reward_name,
            points_spent: row.points_spent,
            status,
            redeemed_at: row.redeemed_at,
        })
    }
}

/// `QuizStore` backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn fetch_active_questions(&self, limit: i64) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM quiz_questions WHERE is_active = TRUE ORDER BY RANDOM() LIMIT $1",
            QUESTION_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch active questions: {:?}", e);
            AppError::from(e)
        })?;

        rows.into_iter().map(Question::try_from).collect()
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM quiz_questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Question::try_from).transpose()
    }

    async fn insert_question(
        &self,
        question: NewQuestion,
        source: QuestionSource,
    ) -> Result<Question, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            INSERT INTO quiz_questions (id, question_text, options, correct_option, tags, is_active, source)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&question.question_text)
        .bind(Json(&question.options))
        .bind(&question.correct_option)
        .bind(&question.tags)
        .bind(source.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert question: {:?}", e);
            AppError::from(e)
        })?;

        Question::try_from(row)
    }

    async fn update_question(&self, question: &Question) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE quiz_questions
            SET question_text = $2, options = $3, correct_option = $4, tags = $5, is_active = $6
            WHERE id = $1
            "#,
        )
        .bind(question.id)
        .bind(&question.question_text)
        .bind(Json(&question.options))
        .bind(&question.correct_option)
        .bind(&question.tags)
        .bind(question.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update question: {:?}", e);
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Question not found".to_string()));
        }

        Ok(())
    }

    async fn question_stats(&self) -> Result<QuestionStats, AppError> {
        let (total, ai_generated): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE source = 'ai') AS ai_generated
            FROM quiz_questions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(QuestionStats {
            total,
            ai_generated,
            manually_created: total - ai_generated,
        })
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn record_attempt(
        &self,
        user_id: Uuid,
        score: i32,
        at: DateTime<Utc>,
    ) -> Result<Profile, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE profiles
            SET daily_quiz_count = daily_quiz_count + 1,
                total_points = total_points + $2,
                last_active_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(score)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Profile not found".to_string()))?;

        Ok(row.into())
    }

    async fn upsert_leaderboard(&self, entry: &LeaderboardEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO leaderboard (user_id, date, daily_score, total_score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, date) DO UPDATE SET
                daily_score = EXCLUDED.daily_score,
                total_score = EXCLUDED.total_score
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.date)
        .bind(entry.daily_score)
        .bind(entry.total_score)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset_daily_counts(&self) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE profiles SET daily_quiz_count = 0 WHERE daily_quiz_count <> 0")
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn daily_leaderboard(
        &self,
        date: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, AppError> {
        let rows: Vec<(Uuid, String, i64)> = sqlx::query_as(
            r#"
            SELECT
                l.user_id,
                COALESCE(p.name, p.email, 'Anonymous') AS name,
                l.daily_score::BIGINT AS score
            FROM leaderboard l
            JOIN profiles p ON p.id = l.user_id
            WHERE l.date = $1
            ORDER BY l.daily_score DESC, l.user_id
            LIMIT $2
            "#,
        )
        .bind(date)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch daily leaderboard: {:?}", e);
            AppError::from(e)
        })?;

        Ok(ranked(rows))
    }

    async fn ranged_leaderboard(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, AppError> {
        let rows: Vec<(Uuid, String, i64)> = sqlx::query_as(
            r#"
            SELECT
                l.user_id,
                COALESCE(p.name, p.email, 'Anonymous') AS name,
                SUM(l.daily_score)::BIGINT AS score
            FROM leaderboard l
            JOIN profiles p ON p.id = l.user_id
            WHERE l.date BETWEEN $1 AND $2
            GROUP BY l.user_id, p.name, p.email
            ORDER BY score DESC, l.user_id
            LIMIT $3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch ranged leaderboard: {:?}", e);
            AppError::from(e)
        })?;

        Ok(ranked(rows))
    }

    async fn all_time_leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardRow>, AppError> {
        let rows: Vec<(Uuid, String, i64)> = sqlx::query_as(
            r#"
            SELECT
                id,
                COALESCE(name, email, 'Anonymous') AS name,
                total_points::BIGINT AS score
            FROM profiles
            ORDER BY total_points DESC, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ranked(rows))
    }

    async fn list_active_rewards(&self) -> Result<Vec<Reward>, AppError> {
        let rows = sqlx::query_as::<_, RewardRow>(&format!(
            "SELECT {} FROM rewards WHERE is_active = TRUE ORDER BY points_required",
            REWARD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reward::try_from).collect()
    }

    async fn get_reward(&self, id: Uuid) -> Result<Option<Reward>, AppError> {
        let row = sqlx::query_as::<_, RewardRow>(&format!(
            "SELECT {} FROM rewards WHERE id = $1",
            REWARD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Reward::try_from).transpose()
    }

    async fn redeem_reward(
        &self,
        user_id: Uuid,
        reward_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<RedeemResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let reward: Reward = sqlx::query_as::<_, RewardRow>(&format!(
            "SELECT {} FROM rewards WHERE id = $1 FOR UPDATE",
            REWARD_COLUMNS
        ))
        .bind(reward_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Reward::try_from)
        .transpose()?
        .filter(|r| r.is_active)
        .ok_or(AppError::NotFound("Reward not found".to_string()))?;

        if reward.stock <= 0 {
            return Err(AppError::Conflict("Reward is out of stock".to_string()));
        }

        let points: i32 =
            sqlx::query_scalar("SELECT total_points FROM profiles WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(AppError::NotFound("Profile not found".to_string()))?;

        if points < reward.points_required {
            return Err(AppError::BadRequest(
                "Not enough points to redeem this reward".to_string(),
            ));
        }

        let remaining_points: i32 = sqlx::query_scalar(
            "UPDATE profiles SET total_points = total_points - $2 WHERE id = $1 RETURNING total_points",
        )
        .bind(user_id)
        .bind(reward.points_required)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE rewards SET stock = stock - 1 WHERE id = $1")
            .bind(reward.id)
            .execute(&mut *tx)
            .await?;

        let redemption_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO user_rewards (id, user_id, reward_id, points_spent, status, redeemed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(redemption_id)
        .bind(user_id)
        .bind(reward.id)
        .bind(reward.points_required)
        .bind(RedemptionStatus::Pending.as_str())
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit redemption: {:?}", e);
            AppError::from(e)
        })?;

        Ok(RedeemResponse {
            redemption: Redemption {
                id: redemption_id,
                reward_id: reward.id,
                reward_name: reward.name,
                points_spent: reward.points_required,
                status: RedemptionStatus::Pending,
                redeemed_at: at,
            },
            remaining_points,
        })
    }

    async fn list_redemptions(&self, user_id: Uuid) -> Result<Vec<Redemption>, AppError> {
        let rows = sqlx::query_as::<_, RedemptionRow>(
            r#"
            SELECT
                ur.id, ur.reward_id, r.name AS reward_name,
                ur.points_spent, ur.status, ur.redeemed_at
            FROM user_rewards ur
            JOIN rewards r ON r.id = ur.reward_id
            WHERE ur.user_id = $1
            ORDER BY ur.redeemed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Redemption::try_from).collect()
    }
}
