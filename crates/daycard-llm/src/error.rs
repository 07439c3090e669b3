//! Generation error types.

use std::time::Duration;

/// Errors that can occur while asking the model for text.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The request never produced an HTTP response (connect, TLS, read).
    #[error("request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("API HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The provider returned a structured error payload.
    #[error("API error: {0}")]
    Api(String),

    /// The response envelope could not be decoded.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The response carried no text content.
    #[error("empty LLM response")]
    EmptyResponse,

    /// The attempt did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
