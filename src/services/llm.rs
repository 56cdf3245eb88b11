// src/services/llm.rs

//! Chat-completion client used to draft quiz questions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::{config::Config, error::AppError};

/// Anything that turns a system instruction and a user prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError>;
}

pub type SharedGenerator = Arc<dyn TextGenerator>;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_url: api_url.into(),
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
            config.openai_temperature,
        )
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    #[instrument(skip(self, system_prompt, user_prompt), fields(model = %self.model))]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("OPENAI_API_KEY is not set".to_string()))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        debug!("Sending chat completion request");
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Chat completion request failed");
                AppError::Upstream(format!("Text generation request failed: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read chat completion response");
            AppError::Upstream(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %text, "Text generation API error");
            return Err(AppError::Upstream(format!(
                "Text generation API error {}: {}",
                status, text
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = ?e, response = %text, "Failed to parse chat completion response");
            AppError::Upstream("Invalid response from text generation API".to_string())
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                AppError::Upstream("Invalid response from text generation API".to_string())
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}
