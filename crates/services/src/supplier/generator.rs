use std::collections::HashSet;
use std::env;
use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ladder_core::{Question, QuestionDraft, QuestionId};

use super::QuestionSupplier;
use crate::error::SupplyError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TOPIC: &str = "German as a foreign language at CEFR level B1";

#[derive(Clone)]
pub struct QuestionGenConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub topic: String,
}

impl QuestionGenConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Returns `None` unless an
    /// API key is present.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup("LADDER_AI_API_KEY")?;
        if api_key.trim().is_empty() {
            return None;
        }
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let base_url = non_empty("LADDER_AI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let model = non_empty("LADDER_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let topic = non_empty("LADDER_QUIZ_TOPIC").unwrap_or_else(|| DEFAULT_TOPIC.into());
        Some(Self {
            base_url,
            api_key,
            model,
            topic,
        })
    }
}

impl fmt::Debug for QuestionGenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionGenConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

/// Generates questions through an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct QuestionGenerator {
    client: Client,
    config: Option<QuestionGenConfig>,
}

impl QuestionGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuestionGenConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<QuestionGenConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Ask the model for `count` questions and return its raw reply.
    ///
    /// # Errors
    ///
    /// Returns `SupplyError` when the generator is disabled, the request fails,
    /// or the response is empty.
    pub async fn generate(
        &self,
        count: usize,
        already_seen: &[String],
    ) -> Result<String, SupplyError> {
        let config = self.config.as_ref().ok_or(SupplyError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(&config.topic, count, already_seen),
            }],
            temperature: 0.7,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(count, model = %config.model, "requesting questions");
        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupplyError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(SupplyError::EmptyResponse)?;

        Ok(content)
    }
}

#[async_trait]
impl QuestionSupplier for QuestionGenerator {
    async fn supply(
        &self,
        count: usize,
        already_seen: &[String],
    ) -> Result<Vec<Question>, SupplyError> {
        let content = self.generate(count, already_seen).await?;
        parse_batch(&content, count, already_seen)
    }
}

fn build_prompt(topic: &str, count: usize, already_seen: &[String]) -> String {
    let seen = serde_json::to_string(already_seen).unwrap_or_else(|_| "[]".into());
    format!(
        "You write quiz questions for learners of {topic}.\n\
         Create {count} unique multiple-choice questions.\n\
         Do not repeat any of these questions: {seen}.\n\
         \n\
         Rules:\n\
         1. The \"question\" field is a short instruction followed by a sentence \
         containing a blank written as '___'.\n\
         2. \"options\" holds exactly four distinct answers.\n\
         3. \"correctAnswer\" is copied verbatim from \"options\".\n\
         4. Two of the wrong options are plausible but incorrect; the last may be \
         more obviously wrong.\n\
         5. Never put the correct answer into the blank.\n\
         \n\
         Reply with a JSON object of the form \
         {{\"questions\":[{{\"question\":\"...\",\"options\":[\"...\"],\"correctAnswer\":\"...\"}}]}}."
    )
}

#[derive(Debug, Deserialize)]
struct Batch {
    questions: Vec<QuestionDraft>,
}

/// Turn a model reply into validated questions with shuffled options.
///
/// Prompts the player has already seen, and repeats within the reply, are
/// dropped before counting.
fn parse_batch(
    content: &str,
    count: usize,
    already_seen: &[String],
) -> Result<Vec<Question>, SupplyError> {
    let batch: Batch = serde_json::from_str(strip_code_fence(content))?;
    let mut prompts: HashSet<String> = already_seen.iter().cloned().collect();
    let fresh: Vec<QuestionDraft> = batch
        .questions
        .into_iter()
        .filter(|draft| prompts.insert(draft.question.clone()))
        .collect();
    if fresh.len() < count {
        return Err(SupplyError::ShortBatch {
            expected: count,
            got: fresh.len(),
        });
    }

    let mut rng = rand::rng();
    fresh
        .into_iter()
        .take(count)
        .map(|draft| {
            Ok(draft
                .validate(QuestionId::random())?
                .with_shuffled_options(&mut rng))
        })
        .collect()
}

/// Some models wrap JSON in a Markdown fence even when asked not to.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
