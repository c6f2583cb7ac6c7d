//! OpenAI-compatible chat completions client.
//!
//! One HTTP client serves both capabilities: [`OpenAiClient`] implements
//! [`ChatModel`] directly, and [`BriefSummarizer`] adapts any `ChatModel` into
//! the [`Summarize`] capability by wrapping the input in a fixed instructional
//! framing. Every request carries a bounded timeout so a stalled endpoint
//! surfaces as an ordinary transport error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatModel, Summarize};
use crate::errors::ModelError;
use crate::message::{Role, Turn};

/// Instructional framing for summarization requests.
pub const SUMMARY_INSTRUCTION: &str = "Summarize this conversation briefly in 1-2 sentences:";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    /// Some endpoints omit content (e.g. pure tool-call replies); normalize
    /// to a concrete string at extraction.
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Create a client for the given endpoint and model.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Endpoint base, e.g. "https://api.openai.com/v1"
    /// * `api_key` - Bearer credential for the endpoint
    /// * `model` - Model identifier string
    /// * `temperature` - Sampling temperature in [0, 1]
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        })
    }

    /// The model identifier this client talks to.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, turns: &[Turn]) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: turns
                .iter()
                .map(|t| WireMessage {
                    role: t.role,
                    content: &t.text,
                })
                .collect(),
        };

        let resp = self
            .http
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = resp.json().await?;
        let choice = body.choices.into_iter().next().ok_or(ModelError::EmptyCompletion)?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

/// Adapts any [`ChatModel`] into the [`Summarize`] capability with a fixed
/// 1-2 sentence framing. Typically backed by a cheaper model than the main
/// conversation.
pub struct BriefSummarizer {
    model: Arc<dyn ChatModel>,
}

impl BriefSummarizer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Build the single-turn summarization request for a transcript blob.
    fn framed(text: &str) -> Turn {
        Turn::user(format!("{SUMMARY_INSTRUCTION}\n{text}"))
    }
}

#[async_trait]
impl Summarize for BriefSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, ModelError> {
        self.model.complete(&[Self::framed(text)]).await
    }
}
