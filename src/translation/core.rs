/*!
 * Core translation service implementation.
 *
 * This module contains the `Translator` contract used by the orchestrator and
 * the `TranslationService` that fulfils it with one of the configured AI
 * providers.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use super::cache::{CacheStats, TranslationCache, truncate_text};

/// Something that turns text in one language into text in another
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`; an error means there is no usable translation
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError>;
}

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Number of provider requests made
    pub requests: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl TokenUsageStats {
    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            requests: 0,
            start_time: Instant::now(),
            api_duration: Duration::ZERO,
            provider,
            model,
        }
    }

    /// Record one completed request
    pub fn record(&mut self, response: &CompletionResponse, elapsed: Duration) {
        self.requests += 1;
        self.prompt_tokens += response.prompt_tokens.unwrap_or(0);
        self.completion_tokens += response.completion_tokens.unwrap_or(0);
        self.api_duration += elapsed;
    }

    /// Prompt plus completion tokens
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration > Duration::ZERO {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens() as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} requests, {} prompt + {} completion tokens, {:.0} tokens/min",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.tokens_per_minute()
        )
    }
}

/// Normalize an endpoint string into a URL with scheme, without trailing slash
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.trim().is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    let url = Url::parse(&with_scheme)?;
    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Build the HTTP client for the configured provider
fn create_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>> {
    let endpoint = normalize_endpoint(&config.get_endpoint())?;
    let timeout_secs = config.get_timeout_secs();
    let retry = config.retry_policy();

    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::Ollama => Arc::new(Ollama::new(endpoint, timeout_secs, retry)),
        TranslationProvider::OpenAI => {
            Arc::new(OpenAI::new(config.get_api_key(), endpoint, timeout_secs, retry))
        }
        TranslationProvider::LMStudio => {
            // LM Studio accepts any key
            let api_key = Some(config.get_api_key())
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| "lm-studio".to_string());
            Arc::new(OpenAI::new(api_key, endpoint, timeout_secs, retry))
        }
        TranslationProvider::Anthropic => {
            Arc::new(Anthropic::new(config.get_api_key(), endpoint, timeout_secs, retry))
        }
    };

    Ok(provider)
}

/// Main translation service for subtitle translation
#[derive(Clone)]
pub struct TranslationService {
    /// Provider implementation
    provider: Arc<dyn Provider>,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Translation cache for storing and retrieving translations
    pub cache: TranslationCache,

    /// Usage shared between clones
    usage: Arc<Mutex<TokenUsageStats>>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let provider = create_provider(&config)?;
        Ok(Self::with_provider(config, provider))
    }

    /// Create a translation service around an existing provider
    pub fn with_provider(config: TranslationConfig, provider: Arc<dyn Provider>) -> Self {
        let usage = TokenUsageStats::with_provider_info(
            config.provider.display_name().to_string(),
            config.get_model(),
        );
        Self {
            provider,
            cache: TranslationCache::new(config.common.enable_cache),
            usage: Arc::new(Mutex::new(usage)),
            config,
        }
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<()> {
        info!("Testing connection to {} with model {}",
              self.config.provider.display_name(), self.config.get_model());
        self.provider.test_connection().await
            .map_err(|e| anyhow!("Failed to connect to {}: {}", self.config.provider.display_name(), e))
    }

    /// System prompt with language placeholders filled in
    pub fn system_prompt(&self, source_language: &str, target_language: &str) -> String {
        let name = |code: &str| language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string());
        self.config.common.system_prompt
            .replace("{source_language}", &name(source_language))
            .replace("{target_language}", &name(target_language))
    }

    /// Snapshot of token usage so far
    pub fn token_usage(&self) -> TokenUsageStats {
        self.usage.lock().clone()
    }

    /// Cache hit and miss counters
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[async_trait]
impl Translator for TranslationService {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if let Some(cached) = self.cache.get(text, source_language, target_language) {
            return Ok(cached);
        }

        let request = CompletionRequest::new(
            self.config.get_model(),
            self.system_prompt(source_language, target_language),
            text,
        ).temperature(self.config.common.temperature);

        let start_time = Instant::now();
        let response = self.provider.complete(request).await?;
        self.usage.lock().record(&response, start_time.elapsed());

        let translated = response.text.trim().to_string();
        debug!("Translated '{}' -> '{}'", truncate_text(text, 40), truncate_text(&translated, 40));

        if !translated.is_empty() {
            self.cache.store(text, source_language, target_language, &translated);
        }
        Ok(translated)
    }
}
