use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use super::{CompletionRequest, CompletionResponse, Provider, RequestPacer, RetryPolicy, response_token_budget, status_error, transport_error};

/// Client for the OpenAI chat completions API and compatible servers (LM Studio)
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL ending in `/v1`
    endpoint: String,
    /// Retry, backoff and rate limit settings
    retry: RetryPolicy,
    /// Request spacing shared by all calls on this client
    pacer: RequestPacer,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl OpenAIRequest {
    /// Create a new request for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Limit the number of generated tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// One generated alternative
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIResponse {
    /// Text of the first choice, empty when there is none
    pub fn first_text(&self) -> String {
        self.choices.first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}

impl OpenAI {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64, retry: RetryPolicy) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs.max(1)))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            pacer: RequestPacer::for_policy(&retry),
            retry,
        }
    }

    /// Chat completions URL for this endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    /// Send a chat completions request
    pub async fn chat(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let url = self.completions_url();
        let url = url.as_str();

        self.retry.run("OpenAI", &self.pacer, || async move {
            let response = self.client.post(url)
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| transport_error("OpenAI", e))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await
                    .unwrap_or_else(|_| "Failed to get error response text".to_string());
                error!("OpenAI API error ({}): {}", status, error_text);
                return Err(status_error(status, error_text));
            }

            response.json::<OpenAIResponse>().await
                .map_err(|e| ProviderError::ParseError(format!("OpenAI: {}", e)))
        }).await
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let max_tokens = response_token_budget(&request.text);
        let chat = OpenAIRequest::new(request.model)
            .add_message("system", request.system_prompt)
            .add_message("user", request.text)
            .temperature(request.temperature)
            .max_tokens(max_tokens);

        let response = self.chat(&chat).await?;
        Ok(CompletionResponse {
            text: response.first_text(),
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.endpoint);
        let response = self.client.get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| transport_error("OpenAI", e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }
}
