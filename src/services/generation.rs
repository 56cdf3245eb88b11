// src/services/generation.rs

use std::sync::LazyLock;

use futures::{StreamExt, TryStreamExt, stream};
use regex::Regex;

use crate::{
    config::DEFAULT_GENERATION_COUNT,
    error::AppError,
    models::{
        generation::GenerateQuestionsRequest,
        question::{NewQuestion, QuestionSource},
    },
    services::llm::SharedGenerator,
    store::SharedStore,
};

pub const SYSTEM_PROMPT: &str =
    "You are a cricket expert who creates quiz questions. Always respond with valid JSON.";

/// First `[` through last `]`, across lines.
static JSON_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("JSON array pattern is valid"));

/// Builds the user prompt asking for `count` questions, optionally focused on `tags`.
pub fn build_prompt(count: u32, tags: &[String]) -> String {
    let mut prompt = format!(
        r#"Generate {count} unique cricket quiz questions with the following requirements:

1. Each question should have 4 possible answers with exactly one correct answer.
2. Format each question as a JSON object with the following structure:
   {{
     "question_text": "The full question text",
     "options": {{
       "a": "First option",
       "b": "Second option",
       "c": "Third option",
       "d": "Fourth option"
     }},
     "correct_option": "The letter (a, b, c, or d) of the correct answer",
     "tags": ["tag1", "tag2"]
   }}
3. Questions should be about cricket history, rules, players, statistics, tournaments (especially IPL), and memorable moments.
4. Ensure the questions are of varying difficulty levels.
5. For tags, use relevant categories like "ipl", "player", "rules", "history", "stats", etc.
6. Return the response as a valid JSON array containing {count} question objects.
"#
    );

    if !tags.is_empty() {
        prompt.push_str(&format!(
            "\nFocus on the following cricket topics: {}.",
            tags.join(", ")
        ));
    }

    prompt
}

/// Pulls the question array out of a model reply that may be wrapped in
/// prose or code fences, and checks every question's shape.
pub fn parse_generated(raw: &str) -> Result<Vec<NewQuestion>, AppError> {
    let json = JSON_ARRAY.find(raw).map(|m| m.as_str()).ok_or_else(|| {
        AppError::MalformedGenerationOutput(
            "Failed to parse model response as JSON: no array found".to_string(),
        )
    })?;

    let parsed: Vec<NewQuestion> = serde_json::from_str(json).map_err(|e| {
        AppError::MalformedGenerationOutput(format!("Failed to parse model response as JSON: {}", e))
    })?;

    parsed
        .into_iter()
        .enumerate()
        .map(|(i, question)| {
            let question = question.normalized();
            question.check().map_err(|e| {
                AppError::MalformedGenerationOutput(format!(
                    "Generated question {} is invalid: {}",
                    i + 1,
                    e.message()
                ))
            })?;
            Ok(question)
        })
        .collect()
}

/// Prompt, call the model, parse, store.
#[derive(Clone)]
pub struct QuestionGenerator {
    llm: SharedGenerator,
    store: SharedStore,
    concurrency: usize,
}

impl QuestionGenerator {
    pub fn new(llm: SharedGenerator, store: SharedStore, concurrency: usize) -> Self {
        Self {
            llm,
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Generates and stores questions, returning what was stored.
    ///
    /// Inserts run concurrently, at most `concurrency` at a time. The first
    /// failed insert aborts the rest; rows already written stay written.
    pub async fn generate(
        &self,
        request: GenerateQuestionsRequest,
    ) -> Result<Vec<NewQuestion>, AppError> {
        let count = request
            .count
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_GENERATION_COUNT);
        let tags: Vec<String> = request
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let prompt = build_prompt(count, &tags);
        tracing::info!(count, tags = ?tags, "Generating quiz questions");

        let raw = self.llm.complete(SYSTEM_PROMPT, &prompt).await?;

        let questions = parse_generated(&raw).inspect_err(|e| {
            tracing::error!("Error parsing generated questions: {}", e);
            tracing::info!(raw = %raw, "Generated content");
        })?;

        tracing::info!("Successfully generated {} quiz questions", questions.len());

        let store = &self.store;
        stream::iter(questions.iter().cloned().map(Ok::<_, AppError>))
            .try_for_each_concurrent(self.concurrency, |question| async move {
                store
                    .insert_question(question, QuestionSource::Ai)
                    .await
                    .map(|_| ())
                    .map_err(|e| {
                        tracing::error!("Error inserting question: {}", e);
                        AppError::GenerationInsertFailed(insert_cause(&e))
                    })
            })
            .await?;

        Ok(questions)
    }
}

/// First line of a store error, capped so driver detail stays out of the envelope.
fn insert_cause(err: &AppError) -> String {
    const MAX_CAUSE_CHARS: usize = 200;

    err.to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(MAX_CAUSE_CHARS)
        .collect()
}
