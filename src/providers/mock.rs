/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds, answers with the text in uppercase
 * - `MockProvider::intermittent(n)` - Fails every n-th request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Succeeds with blank text
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use super::{CompletionRequest, CompletionResponse, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails every Nth request (1-based)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns whitespace only
    Empty,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that fails every `fail_every` requests
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a mock provider that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock provider that answers with blank text
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a working mock provider that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Use a custom function to produce the response text
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &CompletionRequest) -> CompletionResponse {
        let text = match self.custom_response {
            Some(generator) => generator(request),
            None => request.text.to_uppercase(),
        };
        CompletionResponse {
            prompt_tokens: Some(request.text.split_whitespace().count() as u64),
            completion_tokens: Some(text.split_whitespace().count() as u64),
            text,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(&request)),
            MockBehavior::Intermittent { fail_every } if count % fail_every == 0 => {
                Err(ProviderError::ApiError {
                    status_code: 400,
                    message: format!("Simulated failure on request {}", count),
                })
            }
            MockBehavior::Intermittent { .. } => Ok(self.respond(&request)),
            MockBehavior::Failing => {
                Err(ProviderError::ConnectionError("Simulated connection failure".to_string()))
            }
            MockBehavior::Empty => Ok(CompletionResponse {
                text: " \n ".to_string(),
                ..CompletionResponse::default()
            }),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.respond(&request))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }
}
