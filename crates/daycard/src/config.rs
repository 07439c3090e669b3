//! Run configuration with sensible defaults.
//!
//! [`CardConfig`] gathers everything a run needs (model settings, attempt
//! budget, history window, storage paths) and converts it into the client
//! and store types via [`generation_config`](CardConfig::generation_config)
//! and [`store`](CardConfig::store).

use std::path::PathBuf;
use std::time::Duration;

use daycard_llm::{DEFAULT_MODEL, GenerationConfig, RetryConfig};

use crate::history::DEFAULT_HISTORY_WINDOW;
use crate::store::{DEFAULT_HISTORY_PATH, DEFAULT_TODAY_PATH, StateStore};

/// Time allowed for one generation attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for a card generation run.
#[derive(Debug, Clone)]
pub struct CardConfig {
    /// Model identifier. Default: `"openai/gpt-4.1-mini"`.
    pub model: String,
    /// Maximum tokens per response. Default: `2048`.
    pub max_tokens: u32,
    /// Sampling temperature. Default: `0.7`.
    pub temperature: f32,
    /// Attempt budget and backoff. Default: 5 attempts.
    pub retry: RetryConfig,
    /// Days a word stays banned; also the history cap. Default: `14`.
    pub history_window: usize,
    /// Time allowed for one generation attempt. Default: 120 s.
    pub attempt_timeout: Duration,
    pub history_path: PathBuf,
    pub today_path: PathBuf,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            retry: RetryConfig::default(),
            history_window: DEFAULT_HISTORY_WINDOW,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            today_path: PathBuf::from(DEFAULT_TODAY_PATH),
        }
    }
}

impl CardConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the ban window and history cap. A window of zero is raised to one
    /// so a run never discards the day it just recorded.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.max(1);
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_paths(mut self, history: impl Into<PathBuf>, today: impl Into<PathBuf>) -> Self {
        self.history_path = history.into();
        self.today_path = today.into();
        self
    }

    /// Build the client configuration for `api_key`.
    ///
    /// The HTTP timeout matches the attempt timeout so a hung request
    /// surfaces as a transport error rather than outliving its attempt.
    pub fn generation_config(&self, api_key: impl Into<String>) -> GenerationConfig {
        GenerationConfig::new(api_key)
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_request_timeout(self.attempt_timeout)
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(&self.history_path, &self.today_path)
    }
}
