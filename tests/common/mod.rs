// tests/common/mod.rs

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use cricket_quiz::{
    config::Config,
    error::AppError,
    models::{
        profile::Profile,
        question::{Question, QuestionSource},
        reward::{Reward, RewardType},
    },
    routes,
    services::{analytics::TracingNotifier, llm::TextGenerator},
    state::AppState,
    store::MemoryStore,
    utils::jwt::sign_jwt,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Text generator that replays canned replies, one per call.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, AppError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, err: AppError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Upstream("no scripted reply".to_string())))
    }
}

pub struct TestApp {
    pub address: String,
    pub store: MemoryStore,
    pub llm: Arc<ScriptedGenerator>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Seeds a profile and returns its id with a player token.
    pub fn player(&self, name: &str, total_points: i32, daily_quiz_count: i32) -> (Uuid, String) {
        let id = Uuid::new_v4();
        self.store.put_profile(Profile {
            id,
            name: Some(name.to_string()),
            email: None,
            total_points,
            daily_quiz_count,
            last_active_at: None,
            created_at: Some(Utc::now()),
        });
        let token = sign_jwt(id, "authenticated", JWT_SECRET, 600).unwrap();
        (id, token)
    }

    pub fn admin_token(&self) -> String {
        sign_jwt(Uuid::new_v4(), "admin", JWT_SECRET, 600).unwrap()
    }

    /// Seeds `n` active questions whose correct answer is always option "a".
    pub fn seed_questions(&self, n: usize) {
        for i in 0..n {
            let options: BTreeMap<String, String> = [
                ("a", "Right"),
                ("b", "Wrong one"),
                ("c", "Wrong two"),
                ("d", "Wrong three"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
            self.store.put_question(Question {
                id: Uuid::new_v4(),
                question_text: format!("Cricket question {}", i + 1),
                options,
                correct_option: "a".to_string(),
                tags: vec!["history".to_string()],
                is_active: true,
                source: QuestionSource::Manual,
                created_at: Utc::now(),
            });
        }
    }

    pub fn seed_reward(&self, name: &str, points_required: i32, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.store.put_reward(Reward {
            id,
            name: name.to_string(),
            reward_type: RewardType::Merch,
            points_required,
            stock,
            image_url: None,
            is_active: true,
        });
        id
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        openai_api_key: None,
        openai_api_url: "http://127.0.0.1:9/unused".to_string(),
        openai_model: "test-model".to_string(),
        openai_temperature: 0.7,
        generation_concurrency: 2,
        session_ttl_secs: 1800,
        daily_reset_enabled: false,
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Backed by the in-memory store and a scripted text generator.
pub async fn spawn_app() -> TestApp {
    let store = MemoryStore::new();
    let llm = Arc::new(ScriptedGenerator::default());

    let state = AppState::new(
        Arc::new(store.clone()),
        test_config(),
        llm.clone(),
        Arc::new(TracingNotifier),
    );
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        store,
        llm,
        client: reqwest::Client::new(),
    }
}
