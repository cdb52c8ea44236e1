use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use super::{CompletionRequest, CompletionResponse, Provider, RequestPacer, RetryPolicy, status_error, transport_error};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Retry, backoff and rate limit settings
    retry: RetryPolicy,
    /// Request spacing shared by all calls on this client
    pacer: RequestPacer,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Version response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }
}

/// Parse a generate response body.
///
/// Some Ollama builds answer with JSON lines even when streaming is off; the
/// fragments are concatenated in that case.
pub fn parse_generation_body(body: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<GenerationResponse>(body) {
        return Ok(response);
    }

    let fragments: Vec<GenerationResponse> = body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<GenerationResponse>(line).ok())
        .collect();

    let Some(last) = fragments.last() else {
        let preview: String = body.chars().take(500).collect();
        error!("Failed to parse Ollama API response. Raw response (first 500 chars): {}", preview);
        return Err(ProviderError::ParseError("Ollama response contains invalid JSON".to_string()));
    };

    Ok(GenerationResponse {
        model: last.model.clone(),
        response: fragments.iter().map(|f| f.response.as_str()).collect(),
        done: true,
        prompt_eval_count: last.prompt_eval_count,
        eval_count: last.eval_count,
    })
}

impl Ollama {
    /// Create a new Ollama client from a base URL such as `http://localhost:11434`
    ///
    /// Ollama speaks HTTP/1.1; connections are kept alive for parallel requests.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs.max(1)))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .pool_max_idle_per_host(20)
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            pacer: RequestPacer::for_policy(&retry),
            retry,
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let url = url.as_str();

        self.retry.run("Ollama", &self.pacer, || async move {
            let response = self.client.post(url)
                .json(request)
                .send()
                .await
                .map_err(|e| transport_error("Ollama", e))?;

            let status = response.status();
            let body = response.text().await
                .map_err(|e| transport_error("Ollama", e))?;

            if !status.is_success() {
                error!("Ollama API error ({}): {}", status, body);
                return Err(status_error(status, body));
            }

            parse_generation_body(&body)
        }).await
    }

    /// Get the server version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.client.get(&url)
            .send()
            .await
            .map_err(|e| transport_error("Ollama", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let version = response.json::<VersionResponse>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        debug!("Connected to Ollama {}", version.version);
        Ok(version.version)
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let generation = GenerationRequest::new(request.model, request.text)
            .system(request.system_prompt)
            .temperature(request.temperature);

        let response = self.generate(&generation).await?;
        Ok(CompletionResponse {
            text: response.response,
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }
}
