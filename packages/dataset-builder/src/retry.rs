//! Retry with exponential backoff.
//!
//! One configurable policy for every network call in the pipeline: a bounded
//! number of attempts, an initial delay that is multiplied after each failed
//! attempt, and a predicate deciding which failures are worth another try.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use mistral_client::MistralError;

use crate::notify::{NoticeLevel, Notifier};

/// Classifies failures for retry decisions.
pub trait Retryable {
    /// Whether another attempt could succeed.
    fn is_retryable(&self) -> bool;

    /// Whether the failure was a rate-limit response.
    fn is_rate_limited(&self) -> bool {
        false
    }
}

impl Retryable for MistralError {
    fn is_retryable(&self) -> bool {
        MistralError::is_retryable(self)
    }

    fn is_rate_limited(&self) -> bool {
        MistralError::is_rate_limited(self)
    }
}

/// Which failures trigger another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOn {
    /// Every failure the error reports as retryable
    AnyRetryable,
    /// Only rate-limit responses
    RateLimitOnly,
}

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_delay: Duration,
    /// Factor applied to the delay after every failed attempt
    pub multiplier: u32,
    pub retry_on: RetryOn,
}

impl Default for RetryPolicy {
    /// 5 attempts, 3s initial delay, doubled each time, uncapped.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(3),
            multiplier: 2,
            retry_on: RetryOn::AnyRetryable,
        }
    }
}

/// Result of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Success { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Success { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            RetryOutcome::Success { value, .. } => Some(value),
            RetryOutcome::Exhausted { .. } => None,
        }
    }
}

impl RetryPolicy {
    /// Lighter configuration: 3 attempts, 5s initial delay, and only
    /// rate-limit responses are retried.
    pub fn rate_limit_only() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(5),
            multiplier: 2,
            retry_on: RetryOn::RateLimitOnly,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Delay slept after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 1..attempt {
            delay = delay.saturating_mul(self.multiplier);
        }
        delay
    }

    fn should_retry<E: Retryable>(&self, err: &E) -> bool {
        match self.retry_on {
            RetryOn::AnyRetryable => err.is_retryable(),
            RetryOn::RateLimitOnly => err.is_rate_limited(),
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    ///
    /// Nothing is slept after the final attempt.
    pub async fn run<T, E, F, Fut>(
        &self,
        notifier: &dyn Notifier,
        label: &str,
        mut op: F,
    ) -> RetryOutcome<T, E>
    where
        E: Retryable + Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.initial_delay;
        let mut attempt = 1;

        loop {
            let err = match op(attempt).await {
                Ok(value) => {
                    return RetryOutcome::Success {
                        value,
                        attempts: attempt,
                    }
                }
                Err(err) => err,
            };

            if attempt >= max_attempts || !self.should_retry(&err) {
                notifier.notify(
                    NoticeLevel::Error,
                    &format!("{label} failed: {err} (Attempt {attempt}/{max_attempts})"),
                );
                if attempt >= max_attempts {
                    notifier.notify(
                        NoticeLevel::Error,
                        &format!("{label} failed after {max_attempts} attempts"),
                    );
                }
                return RetryOutcome::Exhausted {
                    attempts: attempt,
                    last_error: err,
                };
            }

            if err.is_rate_limited() {
                notifier.notify(
                    NoticeLevel::Warning,
                    &format!(
                        "Rate limit hit for {label}. Waiting {delay:?} before retrying (Attempt {attempt}/{max_attempts})"
                    ),
                );
            } else {
                notifier.notify(
                    NoticeLevel::Error,
                    &format!(
                        "{label} failed: {err}. Retrying in {delay:?} (Attempt {attempt}/{max_attempts})"
                    ),
                );
            }
            warn!(label, attempt, delay_ms = delay.as_millis() as u64, error = %err, "Retrying");

            tokio::time::sleep(delay).await;
            delay = delay.saturating_mul(self.multiplier);
            attempt += 1;
        }
    }
}
