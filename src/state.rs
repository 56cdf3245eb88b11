// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    services::{
        analytics::SharedNotifier,
        attempt::AttemptService,
        generation::QuestionGenerator,
        llm::SharedGenerator,
        session::SessionRegistry,
    },
    store::SharedStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Config,
    pub attempts: AttemptService,
    pub generator: QuestionGenerator,
    pub notifier: SharedNotifier,
}

impl AppState {
    /// Wires the workflows over one store, one text generator and one
    /// analytics sink.
    pub fn new(
        store: SharedStore,
        config: Config,
        llm: SharedGenerator,
        notifier: SharedNotifier,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(chrono::Duration::seconds(
            config.session_ttl_secs,
        )));
        let attempts = AttemptService::new(store.clone(), sessions, notifier.clone());
        let generator = QuestionGenerator::new(llm, store.clone(), config.generation_concurrency);

        Self {
            store,
            config,
            attempts,
            generator,
            notifier,
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for AttemptService {
    fn from_ref(state: &AppState) -> Self {
        state.attempts.clone()
    }
}

impl FromRef<AppState> for QuestionGenerator {
    fn from_ref(state: &AppState) -> Self {
        state.generator.clone()
    }
}

impl FromRef<AppState> for SharedNotifier {
    fn from_ref(state: &AppState) -> Self {
        state.notifier.clone()
    }
}
