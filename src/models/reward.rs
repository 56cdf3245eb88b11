// src/models/reward.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    Badge,
    Merch,
    Coupon,
}

impl RewardType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "badge" => Some(RewardType::Badge),
            "merch" => Some(RewardType::Merch),
            "coupon" => Some(RewardType::Coupon),
            _ => None,
        }
    }
}

/// Represents the 'rewards' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reward {
    pub id: Uuid,
    pub name: String,
    pub reward_type: RewardType,
    pub points_required: i32,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Shipped,
    Delivered,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Shipped => "shipped",
            RedemptionStatus::Delivered => "delivered",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(RedemptionStatus::Pending),
            "shipped" => Some(RedemptionStatus::Shipped),
            "delivered" => Some(RedemptionStatus::Delivered),
            _ => None,
        }
    }
}

/// A redemption, joined with the reward it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Redemption {
    pub id: Uuid,
    pub reward_id: Uuid,
    pub reward_name: String,
    pub points_spent: i32,
    pub status: RedemptionStatus,
    pub redeemed_at: DateTime<Utc>,
}

/// Result of a successful redemption.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedeemResponse {
    pub redemption: Redemption,
    pub remaining_points: i32,
}
