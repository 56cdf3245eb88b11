// src/services/attempt.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::{DAILY_ATTEMPT_LIMIT, QUESTIONS_PER_QUIZ},
    error::AppError,
    models::{
        leaderboard::LeaderboardEntry,
        profile::{Player, Profile},
        question::PublicQuestion,
        quiz::{AnswerResponse, AttemptResult, QuizStatus, StartQuizResponse},
    },
    services::{
        analytics::{QuizEvent, SharedNotifier},
        scoring::is_perfect,
        session::{QuizSession, SessionRegistry},
    },
    store::SharedStore,
};

/// Runs the daily quiz: start an attempt, answer its questions one at a
/// time, then record the outcome.
#[derive(Clone)]
pub struct AttemptService {
    store: SharedStore,
    sessions: Arc<SessionRegistry>,
    notifier: SharedNotifier,
}

impl AttemptService {
    pub fn new(store: SharedStore, sessions: Arc<SessionRegistry>, notifier: SharedNotifier) -> Self {
        Self {
            store,
            sessions,
            notifier,
        }
    }

    async fn profile(&self, player: Player) -> Result<Profile, AppError> {
        self.store
            .get_profile(player.user_id)
            .await?
            .ok_or(AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn status(&self, player: Player) -> Result<QuizStatus, AppError> {
        let profile = self.profile(player).await?;
        Ok(QuizStatus {
            attempts_remaining: profile.attempts_remaining(),
            daily_attempt_limit: DAILY_ATTEMPT_LIMIT,
            total_points: profile.total_points,
        })
    }

    /// Opens a session over up to five active questions.
    ///
    /// The remaining-attempts check runs before any question is fetched.
    pub async fn start(
        &self,
        player: Player,
        now: DateTime<Utc>,
    ) -> Result<StartQuizResponse, AppError> {
        let profile = self.profile(player).await?;
        let attempts_remaining = profile.attempts_remaining();
        if attempts_remaining <= 0 {
            return Err(AppError::NoAttemptsRemaining);
        }

        let questions = self.store.fetch_active_questions(QUESTIONS_PER_QUIZ).await?;
        if questions.is_empty() {
            tracing::warn!("Quiz start requested but no active questions exist");
            return Err(AppError::NoQuestionsAvailable);
        }

        let session = QuizSession::new(player.user_id, questions, now);
        let public: Vec<PublicQuestion> = session.questions().iter().map(PublicQuestion::from).collect();
        let total_questions = session.total();
        let session_id = self.sessions.open(session, now)?;

        self.notifier.notify(&QuizEvent::QuizStarted {
            user_id: player.user_id,
        });

        Ok(StartQuizResponse {
            session_id,
            questions: public,
            total_questions,
            attempts_remaining,
        })
    }

    /// Grades the selected option of the session's current question.
    pub fn answer(
        &self,
        player: Player,
        session_id: Uuid,
        selected: usize,
        now: DateTime<Utc>,
    ) -> Result<AnswerResponse, AppError> {
        let (outcome, total_questions) =
            self.sessions
                .with_session(session_id, player.user_id, now, |session| {
                    let outcome = session.answer(selected)?;
                    Ok((outcome, session.total()))
                })?;

        self.notifier.notify(&QuizEvent::QuestionAnswered {
            user_id: player.user_id,
            correct: outcome.correct,
        });

        Ok(AnswerResponse {
            question_id: outcome.question_id,
            correct: outcome.correct,
            correct_index: outcome.correct_index,
            correct_count: outcome.correct_count,
            current_index: outcome.next_index,
            total_questions,
            completed: outcome.completed,
        })
    }

    /// Records a finished session: one more attempt used, the score added to
    /// the player's points, and today's leaderboard row overwritten.
    ///
    /// The session is discarded whether or not the writes succeed.
    pub async fn complete(
        &self,
        player: Player,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AttemptResult, AppError> {
        let session = self.sessions.finish(session_id, player.user_id, now)?;

        let profile = self.profile(player).await?;
        if profile.attempts_remaining() <= 0 {
            return Err(AppError::NoAttemptsRemaining);
        }

        let score = session.score();
        let correct_count = session.correct_count();
        let total_questions = session.total();

        let updated = self
            .store
            .record_attempt(player.user_id, score, now)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %player.user_id, "Failed to update profile after quiz: {}", e);
                AppError::PersistenceFailed(e.to_string())
            })?;

        let entry = LeaderboardEntry {
            user_id: player.user_id,
            date: now.date_naive(),
            daily_score: score,
            total_score: updated.total_points,
        };
        self.store.upsert_leaderboard(&entry).await.map_err(|e| {
            tracing::error!(user_id = %player.user_id, "Failed to upsert leaderboard: {}", e);
            AppError::PersistenceFailed(e.to_string())
        })?;

        tracing::info!(
            user_id = %player.user_id,
            score,
            correct_count,
            total_questions,
            "Quiz attempt recorded"
        );
        self.notifier.notify(&QuizEvent::QuizCompleted {
            user_id: player.user_id,
            score,
        });

        Ok(AttemptResult {
            score,
            correct_count,
            total_questions,
            perfect_bonus: is_perfect(correct_count, total_questions),
            total_points: updated.total_points,
            daily_quiz_count: updated.daily_quiz_count,
            attempts_remaining: updated.attempts_remaining(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::{
        models::{
            leaderboard::LeaderboardRow,
            question::{NewQuestion, Question, QuestionSource, QuestionStats},
            reward::{RedeemResponse, Redemption, Reward},
        },
        services::analytics::AnalyticsNotifier,
        store::{MemoryStore, QuizStore},
    };

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<QuizEvent>>,
    }

    impl AnalyticsNotifier for RecordingNotifier {
        fn notify(&self, event: &QuizEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    /// Store wrapper that counts question fetches.
    struct CountingStore {
        inner: MemoryStore,
        fetches: Mutex<usize>,
    }

    #[async_trait]
    impl QuizStore for CountingStore {
        async fn fetch_active_questions(&self, limit: i64) -> Result<Vec<Question>, AppError> {
            *self.fetches.lock().unwrap() += 1;
            self.inner.fetch_active_questions(limit).await
        }
        async fn get_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
            self.inner.get_question(id).await
        }
        async fn insert_question(
            &self,
            q: NewQuestion,
            s: QuestionSource,
        ) -> Result<Question, AppError> {
            self.inner.insert_question(q, s).await
        }
        async fn update_question(&self, q: &Question) -> Result<(), AppError> {
            self.inner.update_question(q).await
        }
        async fn question_stats(&self) -> Result<QuestionStats, AppError> {
            self.inner.question_stats().await
        }
        async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
            self.inner.get_profile(id).await
        }
        async fn record_attempt(
            &self,
            id: Uuid,
            score: i32,
            at: DateTime<Utc>,
        ) -> Result<Profile, AppError> {
            self.inner.record_attempt(id, score, at).await
        }
        async fn upsert_leaderboard(&self, e: &LeaderboardEntry) -> Result<(), AppError> {
            self.inner.upsert_leaderboard(e).await
        }
        async fn reset_daily_counts(&self) -> Result<u64, AppError> {
            self.inner.reset_daily_counts().await
        }
        async fn daily_leaderboard(
            &self,
            d: NaiveDate,
            l: i64,
        ) -> Result<Vec<LeaderboardRow>, AppError> {
            self.inner.daily_leaderboard(d, l).await
        }
        async fn ranged_leaderboard(
            &self,
            f: NaiveDate,
            t: NaiveDate,
            l: i64,
        ) -> Result<Vec<LeaderboardRow>, AppError> {
            self.inner.ranged_leaderboard(f, t, l).await
        }
        async fn all_time_leaderboard(&self, l: i64) -> Result<Vec<LeaderboardRow>, AppError> {
            self.inner.all_time_leaderboard(l).await
        }
        async fn list_active_rewards(&self) -> Result<Vec<Reward>, AppError> {
            self.inner.list_active_rewards().await
        }
        async fn get_reward(&self, id: Uuid) -> Result<Option<Reward>, AppError> {
            self.inner.get_reward(id).await
        }
        async fn redeem_reward(
            &self,
            u: Uuid,
            r: Uuid,
            at: DateTime<Utc>,
        ) -> Result<RedeemResponse, AppError> {
            self.inner.redeem_reward(u, r, at).await
        }
        async fn list_redemptions(&self, u: Uuid) -> Result<Vec<Redemption>, AppError> {
            self.inner.list_redemptions(u).await
        }
    }

    fn question(correct: &str) -> Question {
        let options: BTreeMap<String, String> = ["a", "b", "c", "d"]
            .iter()
            .map(|l| (l.to_string(), format!("Option {}", l)))
            .collect();
        Question {
            id: Uuid::new_v4(),
            question_text: "Which team won the first IPL?".to_string(),
            options,
            correct_option: correct.to_string(),
            tags: vec!["ipl".to_string()],
            is_active: true,
            source: QuestionSource::Manual,
            created_at: Utc::now(),
        }
    }

    fn profile(id: Uuid, daily_quiz_count: i32, total_points: i32) -> Profile {
        Profile {
            id,
            name: Some("Rohit".to_string()),
            email: None,
            total_points,
            daily_quiz_count,
            last_active_at: None,
            created_at: None,
        }
    }

    struct Fixture {
        store: Arc<CountingStore>,
        memory: MemoryStore,
        notifier: Arc<RecordingNotifier>,
        service: AttemptService,
        player: Player,
    }

    fn fixture(daily_quiz_count: i32, questions: usize) -> Fixture {
        let memory = MemoryStore::new();
        let player = Player {
            user_id: Uuid::new_v4(),
        };
        memory.put_profile(profile(player.user_id, daily_quiz_count, 100));
        for _ in 0..questions {
            memory.put_question(question("b"));
        }

        let store = Arc::new(CountingStore {
            inner: memory.clone(),
            fetches: Mutex::new(0),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let service = AttemptService::new(
            store.clone(),
            Arc::new(SessionRegistry::new(Duration::minutes(30))),
            notifier.clone(),
        );

        Fixture {
            store,
            memory,
            notifier,
            service,
            player,
        }
    }

    async fn play(f: &Fixture, picks: &[usize], now: DateTime<Utc>) -> AttemptResult {
        let started = f.service.start(f.player, now).await.unwrap();
        for pick in picks {
            f.service
                .answer(f.player, started.session_id, *pick, now)
                .unwrap();
        }
        f.service
            .complete(f.player, started.session_id, now)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn no_attempts_left_never_fetches_questions() {
        let f = fixture(DAILY_ATTEMPT_LIMIT, 5);

        let result = f.service.start(f.player, Utc::now()).await;

        assert!(matches!(result, Err(AppError::NoAttemptsRemaining)));
        assert_eq!(*f.store.fetches.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_question_set_is_reported() {
        let f = fixture(0, 0);

        let result = f.service.start(f.player, Utc::now()).await;

        assert!(matches!(result, Err(AppError::NoQuestionsAvailable)));
    }

    #[tokio::test]
    async fn start_serves_at_most_five_questions() {
        let f = fixture(0, 8);

        let started = f.service.start(f.player, Utc::now()).await.unwrap();

        assert_eq!(started.total_questions, 5);
        assert_eq!(started.questions.len(), 5);
        assert_eq!(started.attempts_remaining, 5);
    }

    #[tokio::test]
    async fn perfect_attempt_updates_profile_and_leaderboard() {
        let f = fixture(1, 5);
        let now = Utc::now();

        let result = play(&f, &[1, 1, 1, 1, 1], now).await;

        assert_eq!(result.score, 70);
        assert!(result.perfect_bonus);
        assert_eq!(result.total_points, 170);
        assert_eq!(result.daily_quiz_count, 2);
        assert_eq!(result.attempts_remaining, 3);

        let entries = f.memory.leaderboard_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].daily_score, 70);
        assert_eq!(entries[0].total_score, 170);
        assert_eq!(entries[0].date, now.date_naive());
    }

    #[tokio::test]
    async fn same_day_completions_overwrite_the_daily_row() {
        let f = fixture(0, 5);
        let now = Utc::now();

        play(&f, &[1, 1, 1, 0, 0], now).await;
        let second = play(&f, &[0, 0, 0, 0, 0], now).await;

        assert_eq!(second.score, 0);
        assert_eq!(second.total_points, 130);
        assert_eq!(second.daily_quiz_count, 2);

        let entries = f.memory.leaderboard_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].daily_score, 0);
        assert_eq!(entries[0].total_score, 130);
    }

    #[tokio::test]
    async fn completing_early_is_rejected_and_keeps_the_session() {
        let f = fixture(0, 2);
        let now = Utc::now();
        let started = f.service.start(f.player, now).await.unwrap();
        f.service.answer(f.player, started.session_id, 1, now).unwrap();

        let early = f.service.complete(f.player, started.session_id, now).await;
        assert!(matches!(early, Err(AppError::Conflict(_))));

        f.service.answer(f.player, started.session_id, 1, now).unwrap();
        let result = f
            .service
            .complete(f.player, started.session_id, now)
            .await
            .unwrap();
        assert_eq!(result.score, 40);
    }

    #[tokio::test]
    async fn persistence_failure_is_generic_and_discards_the_session() {
        let f = fixture(0, 1);
        let now = Utc::now();
        let started = f.service.start(f.player, now).await.unwrap();
        f.service.answer(f.player, started.session_id, 1, now).unwrap();
        f.memory.fail_profile_writes(true);

        let result = f.service.complete(f.player, started.session_id, now).await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::PersistenceFailed(_)));
        assert_eq!(err.message(), "Failed to save results");

        f.memory.fail_profile_writes(false);
        let again = f.service.complete(f.player, started.session_id, now).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn every_step_is_reported_to_analytics() {
        let f = fixture(0, 2);

        play(&f, &[1, 0], Utc::now()).await;

        let events = f.notifier.events.lock().unwrap().clone();
        let actions: Vec<&str> = events.iter().map(|e| e.action()).collect();
        assert_eq!(
            actions,
            vec![
                "quiz_started",
                "question_answered",
                "question_answered",
                "quiz_completed"
            ]
        );
        assert_eq!(
            events[2],
            QuizEvent::QuestionAnswered {
                user_id: f.player.user_id,
                correct: false
            }
        );
    }
}
