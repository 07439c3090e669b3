//! Chat-completions client for the daycard pipeline.
//!
//! `daycard-llm` is the thin layer between the card generator and an
//! OpenRouter-compatible chat completions endpoint. It knows how to send a
//! system + user message pair and pull the text payload back out; it knows
//! nothing about cards, history, or validation.
//!
//! # Where to find things
//!
//! - **Send a raw request:** [`OpenRouterClient::chat`] with a [`ChatRequest`].
//! - **Generate text behind a substitutable seam:** the
//!   [`TextGenerator`](generate::TextGenerator) trait and its production
//!   implementation [`ChatGenerator`](generate::ChatGenerator), built from a
//!   [`GenerationConfig`](generate::GenerationConfig).
//! - **Bound the number of attempts:** [`RetryConfig`](api::retry::RetryConfig)
//!   holds the attempt budget and backoff schedule.
//! - **Handle failures:** every transport problem is a [`GenerationError`].

pub mod api;
pub mod error;
pub mod generate;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub use api::RetryConfig;
pub use error::GenerationError;
pub use generate::{ChatGenerator, GenerateFuture, GenerationConfig, TextGenerator};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for card generation.
pub const DEFAULT_MODEL: &str = "openai/gpt-4.1-mini";

/// Default HTTP timeout for a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body. Unused optional fields are omitted from
/// serialization.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// A message in the conversation.
#[derive(Serialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`OpenRouterClient::chat`].
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenRouter-compatible chat completions API.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    referer: String,
    title: String,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("endpoint", &self.endpoint)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl OpenRouterClient {
    /// Create a client with the default headers whose requests give up
    /// after `timeout`.
    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("daycard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GenerationError::Request(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: OPENROUTER_URL.to_string(),
            referer: "https://github.com/daycard".to_string(),
            title: "daycard".to_string(),
        })
    }

    /// Point the client at a different chat completions URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Send a chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, GenerationError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(start.elapsed())
                } else {
                    GenerationError::Request(e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GenerationError::Request(format!("failed to read response: {e}")))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Decode(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(GenerationError::Api(err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let choice = parsed.choices.and_then(|c| c.into_iter().next());
        Ok(match choice {
            Some(c) => ChatCompletion {
                content: c.message.content,
                usage: parsed.usage,
                finish_reason: c.finish_reason,
            },
            None => {
                debug!("LLM output: empty (no choices)");
                ChatCompletion {
                    content: None,
                    usage: parsed.usage,
                    finish_reason: None,
                }
            }
        })
    }
}
