// src/models/question.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppError, utils::html::clean_html};

/// Whether a question was written by hand or produced by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Manual,
    Ai,
}

impl QuestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionSource::Manual => "manual",
            QuestionSource::Ai => "ai",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "manual" => Some(QuestionSource::Manual),
            "ai" => Some(QuestionSource::Ai),
            _ => None,
        }
    }
}

/// Represents the 'quiz_questions' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub id: Uuid,

    pub question_text: String,

    /// Option letter to option text, e.g. `{"a": "Mumbai Indians", ...}`.
    /// The map is ordered by letter, which also defines the option index.
    pub options: BTreeMap<String, String>,

    /// Letter of the correct option. Always a key of `options`.
    pub correct_option: String,

    pub tags: Vec<String>,

    /// Inactive questions are never served.
    pub is_active: bool,

    pub source: QuestionSource,

    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Position of the correct option in letter order.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.keys().position(|k| *k == self.correct_option)
    }
}

/// A single answer choice as shown to players.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionView {
    pub index: usize,
    pub letter: String,
    pub text: String,
}

/// DTO for sending a question to players (excludes the correct option).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub options: Vec<OptionView>,
    pub tags: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text.clone(),
            options: q
                .options
                .iter()
                .enumerate()
                .map(|(index, (letter, text))| OptionView {
                    index,
                    letter: letter.clone(),
                    text: text.clone(),
                })
                .collect(),
            tags: q.tags.clone(),
        }
    }
}

/// A question about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewQuestion {
    pub question_text: String,
    pub options: BTreeMap<String, String>,
    pub correct_option: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewQuestion {
    /// Trims and lowercases letters and tags, and strips unsafe markup from text.
    pub fn normalized(self) -> Self {
        Self {
            question_text: clean_html(self.question_text.trim()),
            options: self
                .options
                .into_iter()
                .map(|(letter, text)| (letter.trim().to_lowercase(), clean_html(text.trim())))
                .collect(),
            correct_option: self.correct_option.trim().to_lowercase(),
            tags: self
                .tags
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Checks the shape every stored question must have.
    pub fn check(&self) -> Result<(), AppError> {
        check_shape(&self.question_text, &self.options, &self.correct_option)
    }
}

pub(crate) fn check_shape(
    question_text: &str,
    options: &BTreeMap<String, String>,
    correct_option: &str,
) -> Result<(), AppError> {
    if question_text.trim().is_empty() {
        return Err(AppError::BadRequest("Question text cannot be empty".to_string()));
    }
    if options.len() != 4 {
        return Err(AppError::BadRequest(format!(
            "Expected exactly 4 options, got {}",
            options.len()
        )));
    }
    if options.values().any(|text| text.trim().is_empty()) {
        return Err(AppError::BadRequest("Options cannot be empty".to_string()));
    }
    if !options.contains_key(correct_option) {
        return Err(AppError::BadRequest(format!(
            "Correct option '{}' is not one of the options",
            correct_option
        )));
    }
    Ok(())
}

/// DTO for creating a question by hand.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    #[validate(custom(function = validate_options))]
    pub options: BTreeMap<String, String>,
    #[validate(length(min = 1, max = 1))]
    pub correct_option: String,
    #[serde(default)]
    #[validate(custom(function = validate_tags))]
    pub tags: Vec<String>,
}

impl From<CreateQuestionRequest> for NewQuestion {
    fn from(req: CreateQuestionRequest) -> Self {
        Self {
            question_text: req.question_text,
            options: req.options,
            correct_option: req.correct_option,
            tags: req.tags,
        }
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Option<BTreeMap<String, String>>,
    #[validate(length(min = 1, max = 1))]
    pub correct_option: Option<String>,
    #[validate(custom(function = validate_tags))]
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl UpdateQuestionRequest {
    pub fn is_empty(&self) -> bool {
        self.question_text.is_none()
            && self.options.is_none()
            && self.correct_option.is_none()
            && self.tags.is_none()
            && self.is_active.is_none()
    }

    /// Applies the present fields to `question`, keeping the shape invariant.
    pub fn apply(self, mut question: Question) -> Result<Question, AppError> {
        let draft = NewQuestion {
            question_text: self.question_text.unwrap_or(question.question_text),
            options: self.options.unwrap_or(question.options),
            correct_option: self.correct_option.unwrap_or(question.correct_option),
            tags: self.tags.unwrap_or(question.tags),
        }
        .normalized();
        draft.check()?;

        question.question_text = draft.question_text;
        question.options = draft.options;
        question.correct_option = draft.correct_option;
        question.tags = draft.tags;
        if let Some(active) = self.is_active {
            question.is_active = active;
        }
        Ok(question)
    }
}

fn validate_options(options: &BTreeMap<String, String>) -> Result<(), validator::ValidationError> {
    if options.len() != 4 {
        return Err(validator::ValidationError::new("exactly_four_options"));
    }
    for (letter, text) in options {
        if letter.trim().chars().count() != 1 {
            return Err(validator::ValidationError::new("option_letter_invalid"));
        }
        if text.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    if tags.len() > 20 {
        return Err(validator::ValidationError::new("too_many_tags"));
    }
    if tags.iter().any(|t| t.len() > 50) {
        return Err(validator::ValidationError::new("tag_too_long"));
    }
    Ok(())
}

/// Question counts broken down by source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuestionStats {
    pub total: i64,
    pub ai_generated: i64,
    pub manually_created: i64,
}
