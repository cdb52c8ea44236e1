/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API and OpenAI-compatible servers such as LM Studio
 * - Anthropic: Anthropic API integration
 * - Mock: scripted provider used by tests
 */

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::errors::ProviderError;

/// A single completion request, independent of the backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name
    pub model: String,
    /// Instructions for the model
    pub system_prompt: String,
    /// The text to work on
    pub text: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            text: text.into(),
            temperature: 0.3,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text produced by a provider plus token accounting when available
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Prompt tokens reported by the backend
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the backend
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Retry and pacing settings shared by the HTTP clients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base backoff, doubled on each retry
    pub backoff_base_ms: u64,
    /// Requests per minute, `None` for unlimited
    pub rate_limit: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
            rate_limit: None,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << shift))
    }

    /// Minimum spacing between requests implied by the rate limit
    pub fn pacing(&self) -> Option<Duration> {
        self.rate_limit
            .filter(|rpm| *rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / rpm as u64))
    }

    /// Run `operation` until it succeeds, fails permanently, or runs out of retries.
    ///
    /// Every attempt, retries included, first waits for its slot in `pacer`.
    pub async fn run<T, F, Fut>(&self, label: &str, pacer: &RequestPacer, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            pacer.wait(label).await;

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("{} request failed: {} - attempt {}/{}", label, e, attempt, self.max_retries + 1);
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Output token budget for translating `text`: about two tokens per input
/// character, kept between 256 and 4096
pub fn response_token_budget(text: &str) -> u32 {
    u32::try_from(text.chars().count())
        .unwrap_or(u32::MAX)
        .saturating_mul(2)
        .clamp(256, 4096)
}

/// Spaces requests of one client according to its rate limit.
///
/// Clones share the same schedule, so concurrent callers queue up behind each other.
#[derive(Debug, Clone, Default)]
pub struct RequestPacer {
    interval: Option<Duration>,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Pacer derived from a retry policy's rate limit
    pub fn for_policy(policy: &RetryPolicy) -> Self {
        Self::new(policy.pacing())
    }

    /// Wait until the next request slot is free and claim it
    pub async fn wait(&self, label: &str) {
        let Some(interval) = self.interval else {
            return;
        };

        let now = Instant::now();
        let slot = {
            let mut next_slot = self.next_slot.lock();
            let slot = next_slot.map_or(now, |next| next.max(now));
            *next_slot = Some(slot + interval);
            slot
        };

        if slot > now {
            debug!("{} rate limit: waiting {:?} before next request", label, slot - now);
            tokio::time::sleep_until(slot).await;
        }
    }
}

/// Map a reqwest transport error onto a provider error
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, error))
    }
}

/// Map a non-success HTTP status onto a provider error
pub(crate) fn status_error(status: reqwest::StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError { status_code: code, message },
    }
}

pub mod ollama;
pub mod openai;
pub mod anthropic;
pub mod mock;
