//! The text-generation seam.
//!
//! The card pipeline only needs "system + user prompt in, text out". The
//! [`TextGenerator`] trait captures exactly that so the orchestrator can be
//! driven by a scripted fake in tests and by [`ChatGenerator`] in production.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::{
    ChatRequest, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT, GenerationError, Message, OPENROUTER_URL,
    OpenRouterClient,
};

/// Boxed future returned by [`TextGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// Something that turns a system instruction and a user prompt into raw text.
///
/// Uses a boxed future so that the trait is dyn-compatible.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, system: &'a str, user: &'a str) -> GenerateFuture<'a>;
}

/// Explicit configuration for [`ChatGenerator`]. Nothing is read from the
/// process environment by the generator itself.
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Default: `2048`.
    pub max_tokens: u32,
    /// Default: `0.7`.
    pub temperature: f32,
    /// HTTP timeout for one request. Default: 120 s.
    pub request_timeout: Duration,
    /// Chat completions URL. Default: [`OPENROUTER_URL`].
    pub endpoint: String,
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            endpoint: OPENROUTER_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// [`TextGenerator`] backed by a chat completions endpoint.
#[derive(Debug)]
pub struct ChatGenerator {
    client: OpenRouterClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let client = OpenRouterClient::with_timeout(config.api_key, config.request_timeout)?
            .with_endpoint(config.endpoint);
        Ok(Self {
            client,
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for ChatGenerator {
    fn generate<'a>(&'a self, system: &'a str, user: &'a str) -> GenerateFuture<'a> {
        Box::pin(async move {
            let body = ChatRequest {
                model: self.model.clone(),
                messages: vec![Message::system(system), Message::user(user)],
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                ..Default::default()
            };

            let completion = self.client.chat(&body).await?;
            if let Some(reason) = completion.finish_reason.as_deref() {
                debug!("finish_reason={reason}");
            }

            let text = completion
                .content
                .map(|c| c.trim().to_string())
                .unwrap_or_default();
            if text.is_empty() {
                return Err(GenerationError::EmptyResponse);
            }
            Ok(text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GenerationConfig::new("key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.endpoint, OPENROUTER_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn config_debug_hides_api_key() {
        let config = GenerationConfig::new("sk-secret").with_model("m");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("\"m\""));
    }

    #[test]
    fn generator_keeps_configured_model() {
        let generator =
            ChatGenerator::new(GenerationConfig::new("key").with_model("openai/gpt-4.1")).unwrap();
        assert_eq!(generator.model(), "openai/gpt-4.1");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_generation_error() {
        let config = GenerationConfig::new("key")
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions")
            .with_request_timeout(Duration::from_secs(2));
        let generator = ChatGenerator::new(config).unwrap();
        let result = generator.generate("system", "user").await;
        assert!(result.is_err());
    }
}
