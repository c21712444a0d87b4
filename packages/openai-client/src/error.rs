//! Error types for the OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Missing API key or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// Network failures are the only ones a caller may reasonably retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, OpenAIError::Network(_))
    }
}
