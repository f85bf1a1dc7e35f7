//! Error types for Mistral client.

use thiserror::Error;

/// Result type for Mistral client operations.
pub type Result<T> = std::result::Result<T, MistralError>;

/// Mistral client errors.
#[derive(Debug, Error)]
pub enum MistralError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {message}")]
    Network { message: String, timeout: bool },

    /// HTTP 429 from the completions endpoint
    #[error("Rate limited by Mistral API")]
    RateLimited,

    /// API error (any other non-2xx response)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl MistralError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        Self::Network {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
