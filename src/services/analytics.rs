// src/services/analytics.rs

use std::sync::Arc;

use uuid::Uuid;

/// Engagement events emitted by the quiz and reward flows.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    QuizStarted { user_id: Uuid },
    QuestionAnswered { user_id: Uuid, correct: bool },
    QuizCompleted { user_id: Uuid, score: i32 },
    RewardClaimed { user_id: Uuid, reward_name: String, points_cost: i32 },
}

impl QuizEvent {
    pub fn action(&self) -> &'static str {
        match self {
            QuizEvent::QuizStarted { .. } => "quiz_started",
            QuizEvent::QuestionAnswered { .. } => "question_answered",
            QuizEvent::QuizCompleted { .. } => "quiz_completed",
            QuizEvent::RewardClaimed { .. } => "reward_claimed",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            QuizEvent::RewardClaimed { .. } => "rewards",
            _ => "engagement",
        }
    }

    pub fn label(&self) -> Option<String> {
        match self {
            QuizEvent::QuestionAnswered { correct, .. } => Some(
                if *correct { "correct" } else { "incorrect" }.to_string(),
            ),
            QuizEvent::RewardClaimed { reward_name, .. } => Some(reward_name.clone()),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            QuizEvent::QuizCompleted { score, .. } => Some(*score),
            QuizEvent::RewardClaimed { points_cost, .. } => Some(*points_cost),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            QuizEvent::QuizStarted { user_id }
            | QuizEvent::QuestionAnswered { user_id, .. }
            | QuizEvent::QuizCompleted { user_id, .. }
            | QuizEvent::RewardClaimed { user_id, .. } => *user_id,
        }
    }
}

/// Sink for analytics events.
///
/// Called inline by the workflows. Implementations must not fail the
/// caller: any delivery error is handled (or dropped) inside `notify`.
pub trait AnalyticsNotifier: Send + Sync {
    fn notify(&self, event: &QuizEvent);
}

pub type SharedNotifier = Arc<dyn AnalyticsNotifier>;

/// Writes every event to the `analytics` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl AnalyticsNotifier for TracingNotifier {
    fn notify(&self, event: &QuizEvent) {
        tracing::info!(
            target: "analytics",
            action = event.action(),
            category = event.category(),
            label = ?event.label(),
            value = ?event.value(),
            user_id = %event.user_id(),
            "analytics event"
        );
    }
}
