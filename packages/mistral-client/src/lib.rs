//! Pure Mistral REST API client
//!
//! A minimal client for the Mistral chat completions endpoint with no
//! domain-specific logic and no retries. Callers decide how to react to
//! rate limits and transient failures; every failure mode is reported as a
//! distinct [`MistralError`] variant so that decision is easy to make.
//!
//! # Example
//!
//! ```rust,ignore
//! use mistral_client::{ChatRequest, Message, MistralClient};
//!
//! let client = MistralClient::from_env()?;
//!
//! let response = client.chat_completion(
//!     &ChatRequest::new("mistral-large-latest")
//!         .message(Message::user("Summarize: Rust is a systems language."))
//!         .temperature(0.7)
//!         .max_tokens(1000),
//! ).await?;
//!
//! println!("{}", response.content);
//! ```

pub mod error;
pub mod types;

pub use error::{MistralError, Result};
pub use types::*;

use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Default connect timeout for a single request.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default total timeout for a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Pure Mistral API client.
pub struct MistralClient {
    http_client: Client,
    api_key: SecretString,
    base_url: String,
}

impl MistralClient {
    /// Create a client with the default 30s connect / 60s total timeouts.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeouts(api_key, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with explicit per-request timeouts.
    ///
    /// `connect` bounds connection establishment, `total` bounds the whole
    /// request including reading the body.
    pub fn with_timeouts(
        api_key: impl Into<String>,
        connect: Duration,
        total: Duration,
    ) -> Result<Self> {
        let api_key: String = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MistralError::Config("Mistral API key is empty".into()));
        }

        let http_client = Client::builder()
            .connect_timeout(connect)
            .timeout(total)
            .build()
            .map_err(|e| MistralError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: SecretBox::new(api_key.into_boxed_str()),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create from environment variable `MISTRAL_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MISTRAL_API_KEY")
            .map_err(|_| MistralError::Config("MISTRAL_API_KEY not set".into()))?;
        Self::new(api_key)
    }

    /// Set a custom base URL (for proxies, self-hosted gateways, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Chat completion.
    ///
    /// Exactly one HTTP request is made. HTTP 429 maps to
    /// [`MistralError::RateLimited`], any other status except 200 to
    /// [`MistralError::Api`], connection failures and timeouts to
    /// [`MistralError::Network`] and a body without
    /// `choices[0].message.content` to [`MistralError::Parse`].
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.completions_url())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "Mistral request failed");
                MistralError::from_reqwest(e)
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Mistral API rate limit hit");
            return Err(MistralError::RateLimited);
        }
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Mistral API error");
            return Err(MistralError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await.map_err(MistralError::from_reqwest)?;
        let chat_response: types::ChatResponseRaw =
            serde_json::from_str(&body).map_err(|e| MistralError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| MistralError::Parse("No choices in Mistral response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Mistral chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}

impl fmt::Debug for MistralClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn request() -> ChatRequest {
        ChatRequest::new(DEFAULT_MODEL)
            .message(Message::user("Task: summarize\nPrompt: p\nText: t"))
            .temperature(0.7)
            .max_tokens(1000)
    }

    #[test]
    fn test_client_builder() {
        let client = MistralClient::new("sk-test")
            .unwrap()
            .with_base_url("https://custom.api.com/v1/");

        assert_eq!(client.base_url(), "https://custom.api.com/v1");
        assert_eq!(
            client.completions_url(),
            "https://custom.api.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            MistralClient::new("  "),
            Err(MistralError::Config(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = MistralClient::new("sk-super-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_chat_completion_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "mistral-large-latest",
                "max_tokens": 1000
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"A summary."}}],
                   "usage":{"prompt_tokens":10,"completion_tokens":3,"total_tokens":13}}"#,
            )
            .create_async()
            .await;

        let client = MistralClient::new("sk-test")
            .unwrap()
            .with_base_url(server.url());
        let response = client.chat_completion(&request()).await.unwrap();

        assert_eq!(response.content, "A summary.");
        assert_eq!(response.usage.unwrap().total_tokens, 13);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_rate_limited() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .create_async()
            .await;

        let client = MistralClient::new("sk-test")
            .unwrap()
            .with_base_url(server.url());
        let err = client.chat_completion(&request()).await.unwrap_err();

        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = MistralClient::new("sk-test")
            .unwrap()
            .with_base_url(server.url());
        let err = client.chat_completion(&request()).await.unwrap_err();

        match err {
            MistralError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_200_success_status_maps_to_api() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(202)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"queued"}}]}"#)
            .create_async()
            .await;

        let client = MistralClient::new("sk-test")
            .unwrap()
            .with_base_url(server.url());
        let err = client.chat_completion(&request()).await.unwrap_err();

        assert!(matches!(err, MistralError::Api { status: 202, .. }));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_parse_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = MistralClient::new("sk-test")
            .unwrap()
            .with_base_url(server.url());
        let err = client.chat_completion(&request()).await.unwrap_err();

        assert!(matches!(err, MistralError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 9 of localhost in the test environment.
        let client = MistralClient::with_timeouts(
            "sk-test",
            Duration::from_millis(500),
            Duration::from_secs(1),
        )
        .unwrap()
        .with_base_url("http://127.0.0.1:9");
        let err = client.chat_completion(&request()).await.unwrap_err();

        assert!(matches!(err, MistralError::Network { .. }));
    }
}
