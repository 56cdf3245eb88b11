// src/services/session.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{error::AppError, models::question::Question, services::scoring::compute_score};

/// One player's run through a set of questions. Lives only in memory and is
/// dropped once the attempt is recorded or the session expires.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    user_id: Uuid,
    questions: Vec<Question>,
    current: usize,
    correct: u32,
    completed: bool,
    started_at: DateTime<Utc>,
}

/// What happened when the current question was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: Uuid,
    pub correct: bool,
    pub correct_index: Option<usize>,
    pub correct_count: u32,
    pub next_index: usize,
    pub completed: bool,
}

impl QuizSession {
    pub fn new(user_id: Uuid, questions: Vec<Question>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            questions,
            current: 0,
            correct: 0,
            completed: false,
            started_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn score(&self) -> i32 {
        compute_score(self.correct, self.total())
    }

    /// Grades `selected` against the current question and advances.
    ///
    /// # Errors
    ///
    /// * `Conflict` if the session is already complete.
    /// * `BadRequest` if `selected` is not an option index of the question.
    pub fn answer(&mut self, selected: usize) -> Result<AnswerOutcome, AppError> {
        if self.completed {
            return Err(AppError::Conflict("Quiz is already completed".to_string()));
        }
        let question = self
            .questions
            .get(self.current)
            .ok_or_else(|| AppError::Conflict("Quiz is already completed".to_string()))?;

        if selected >= question.options.len() {
            return Err(AppError::BadRequest(format!(
                "Selected option {} does not exist",
                selected
            )));
        }

        let correct_index = question.correct_index();
        let correct = correct_index == Some(selected);
        let question_id = question.id;

        if correct {
            self.correct += 1;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.current = self.questions.len();
            self.completed = true;
        }

        Ok(AnswerOutcome {
            question_id,
            correct,
            correct_index,
            correct_count: self.correct,
            next_index: self.current,
            completed: self.completed,
        })
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.started_at > ttl
    }
}

/// Open quiz sessions keyed by id. A player holds at most one.
pub struct SessionRegistry {
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, QuizSession>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, QuizSession>>, AppError> {
        self.sessions
            .lock()
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    /// Registers `session`, replacing any other session of the same player
    /// and dropping expired ones.
    pub fn open(&self, session: QuizSession, now: DateTime<Utc>) -> Result<Uuid, AppError> {
        let mut sessions = self.lock()?;
        let ttl = self.ttl;
        sessions.retain(|_, s| s.user_id != session.user_id && !s.is_expired(now, ttl));
        let id = session.id;
        sessions.insert(id, session);
        Ok(id)
    }

    /// Runs `f` on the player's live session.
    ///
    /// # Errors
    ///
    /// `NotFound` if the session is unknown, expired or owned by someone else.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut QuizSession) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut sessions = self.lock()?;
        let expired = match sessions.get(&id) {
            Some(s) => s.is_expired(now, self.ttl),
            None => return Err(session_not_found()),
        };
        if expired {
            sessions.remove(&id);
            return Err(session_not_found());
        }

        match sessions.get_mut(&id) {
            Some(s) if s.user_id == user_id => f(s),
            _ => Err(session_not_found()),
        }
    }

    /// Removes and returns a completed session.
    ///
    /// # Errors
    ///
    /// * `NotFound` as for `with_session`.
    /// * `Conflict` if questions remain unanswered; the session is kept.
    pub fn finish(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> Result<QuizSession, AppError> {
        self.with_session(id, user_id, now, |s| {
            if s.is_completed() {
                Ok(())
            } else {
                Err(AppError::Conflict("Quiz is not finished yet".to_string()))
            }
        })?;

        self.lock()?.remove(&id).ok_or_else(session_not_found)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn session_not_found() -> AppError {
    AppError::NotFound("Quiz session not found or expired".to_string())
}
