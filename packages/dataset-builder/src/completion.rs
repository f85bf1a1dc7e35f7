//! Resilient completion requests.
//!
//! [`ResilientCompletionClient`] turns one `(task, text, prompt)` triple into
//! one logical completion. Retries, backoff and failure reporting stay
//! inside; callers only see `Some(response)` or `None`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use mistral_client::{ChatRequest, ChatResponse, Message, MistralClient, MistralError, DEFAULT_MODEL};

use crate::notify::{NoticeLevel, Notifier};
use crate::retry::{RetryOutcome, RetryPolicy};

/// Longest text sent to the model, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Drop non-ASCII characters, then keep the first [`MAX_TEXT_CHARS`].
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii)
        .take(MAX_TEXT_CHARS)
        .collect()
}

/// Content of the single user message sent for a task.
pub fn user_message(task_kind: &str, prompt: &str, text: &str) -> String {
    format!("Task: {task_kind}\nPrompt: {prompt}\nText: {text}")
}

// =============================================================================
// Completion Backend Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseCompletion: Send + Sync {
    /// Issue exactly one chat completion request.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, MistralError>;
}

#[async_trait]
impl BaseCompletion for MistralClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, MistralError> {
        self.chat_completion(request).await
    }
}

/// Model parameters shared by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub result_text: String,
    pub attempts: u32,
}

/// Completion client with bounded retries and exponential backoff.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent requests.
pub struct ResilientCompletionClient {
    backend: Arc<dyn BaseCompletion>,
    settings: CompletionSettings,
    policy: RetryPolicy,
    notifier: Arc<dyn Notifier>,
}

impl ResilientCompletionClient {
    pub fn new(backend: Arc<dyn BaseCompletion>, notifier: Arc<dyn Notifier>) -> Self {
        notifier.notify(
            NoticeLevel::Warning,
            "Ensure compliance with Mistral Terms of Service.",
        );
        Self {
            backend,
            settings: CompletionSettings::default(),
            policy: RetryPolicy::default(),
            notifier,
        }
    }

    pub fn with_settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Build the request for a task. `text` is sanitized here.
    pub fn build_request(&self, task_kind: &str, text: &str, prompt: &str) -> ChatRequest {
        let text = sanitize_text(text);
        ChatRequest::new(&self.settings.model)
            .message(Message::user(user_message(task_kind, prompt, &text)))
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature)
    }

    /// Run one completion. Returns `None` once every attempt has failed;
    /// failures are reported through the notifier, never returned.
    pub async fn complete(
        &self,
        task_kind: &str,
        text: &str,
        prompt: &str,
    ) -> Option<CompletionResponse> {
        let request = self.build_request(task_kind, text, prompt);
        let max_attempts = self.policy.max_attempts.max(1);
        let label = format!("Mistral {task_kind} request");

        let outcome = self
            .policy
            .run(self.notifier.as_ref(), &label, |attempt| {
                self.notifier.notify(
                    NoticeLevel::Processing,
                    &format!("Processing {task_kind} with Mistral (Attempt {attempt}/{max_attempts})"),
                );
                self.backend.complete(&request)
            })
            .await;

        match outcome {
            RetryOutcome::Success { value, attempts } => {
                self.notifier
                    .notify(NoticeLevel::Done, &format!("Mistral processed {task_kind}"));
                info!(task = task_kind, attempts, "Completion succeeded");
                Some(CompletionResponse {
                    result_text: value.content,
                    attempts,
                })
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                debug!(task = task_kind, attempts, error = %last_error, "Completion gave up");
                None
            }
        }
    }
}
