// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::DAILY_ATTEMPT_LIMIT;

/// Represents the 'profiles' table in the database.
/// Rows are created by the identity provider at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub total_points: i32,
    /// Attempts used today. Reset to 0 by the daily reset job.
    pub daily_quiz_count: i32,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn attempts_remaining(&self) -> i32 {
        (DAILY_ATTEMPT_LIMIT - self.daily_quiz_count).max(0)
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}

/// Profile of the current player plus derived fields.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    #[serde(flatten)]
    pub profile: Profile,
    pub attempts_remaining: i32,
}

impl From<Profile> for MeResponse {
    fn from(profile: Profile) -> Self {
        let attempts_remaining = profile.attempts_remaining();
        Self {
            profile,
            attempts_remaining,
        }
    }
}

/// Identity of the caller, taken from verified token claims and passed
/// explicitly into every workflow call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(count: i32) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: None,
            email: Some("fan@example.com".to_string()),
            total_points: 0,
            daily_quiz_count: count,
            last_active_at: None,
            created_at: None,
        }
    }

    #[test]
    fn attempts_remaining_never_goes_negative() {
        assert_eq!(profile(0).attempts_remaining(), 5);
        assert_eq!(profile(4).attempts_remaining(), 1);
        assert_eq!(profile(5).attempts_remaining(), 0);
        assert_eq!(profile(9).attempts_remaining(), 0);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(profile(0).display_name(), "fan@example.com");
    }
}
