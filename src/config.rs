// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

/// Attempts a player may spend per day.
pub const DAILY_ATTEMPT_LIMIT: i32 = 5;

/// Maximum number of questions served in one attempt.
pub const QUESTIONS_PER_QUIZ: i64 = 5;

/// Points awarded for each correct answer.
pub const POINTS_PER_CORRECT: i32 = 10;

/// Flat bonus when every question of an attempt is answered correctly.
pub const PERFECT_SCORE_BONUS: i32 = 20;

/// Questions requested from the generator when the caller does not say.
pub const DEFAULT_GENERATION_COUNT: u32 = 5;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,

    /// Absent key is not fatal at start-up; generation requests fail instead.
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,

    /// Upper bound on concurrent inserts while storing generated questions.
    pub generation_concurrency: usize,

    /// Seconds an unfinished quiz session is kept before it is dropped.
    pub session_ttl_secs: i64,

    pub daily_reset_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        let openai_api_url =
            env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string());
        Url::parse(&openai_api_url).map_err(|e| {
            AppError::InternalServerError(format!("OPENAI_API_URL is not a valid URL: {}", e))
        })?;

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            cors_origins,
            openai_api_key,
            openai_api_url,
            openai_model,
            openai_temperature: parsed_or("OPENAI_TEMPERATURE", 0.7)?,
            generation_concurrency: parsed_or::<usize>("GENERATION_CONCURRENCY", 4)?.max(1),
            session_ttl_secs: parsed_or("SESSION_TTL_SECS", 1800)?,
            daily_reset_enabled: parsed_or("DAILY_RESET_ENABLED", true)?,
        })
    }
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::InternalServerError(format!("{} must be set", name)))
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} has an invalid value", name))),
        Err(_) => Ok(default),
    }
}
