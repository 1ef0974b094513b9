/*!
 * Provider implementations for different model services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI-compatible: OpenRouter, OpenAI and LM Studio
 * - Anthropic: Anthropic API integration
 * - Ollama: Local LLM server
 * - Mock: scripted replies for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{AppError, ProviderError};

/// Reply format requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,
    /// A single JSON value
    Json,
}

/// One prompt sent to a model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The user message
    pub prompt: String,
    /// Requested reply format
    pub format: ResponseFormat,
}

impl CompletionRequest {
    /// Request a JSON reply
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json,
        }
    }

    /// Request a free text reply
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }
}

/// Reply from a model with its billed cost
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    /// Reply text
    pub text: String,
    /// Monetary cost of the call, in dollars
    pub cost: f64,
    /// Prompt tokens, when reported
    pub prompt_tokens: Option<u64>,
    /// Completion tokens, when reported
    pub completion_tokens: Option<u64>,
}

/// Per-million token prices used when the service reports no cost
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pricing {
    pub prompt_per_million: f64,
    pub completion_per_million: f64,
}

impl Pricing {
    pub fn new(prompt_per_million: f64, completion_per_million: f64) -> Self {
        Self {
            prompt_per_million,
            completion_per_million,
        }
    }

    /// Cost of a call from its token usage
    pub fn cost(&self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) -> f64 {
        let prompt = prompt_tokens.unwrap_or(0) as f64 * self.prompt_per_million;
        let completion = completion_tokens.unwrap_or(0) as f64 * self.completion_per_million;
        (prompt + completion) / 1_000_000.0
    }
}

/// Common trait for all LLM providers
///
/// A provider turns one prompt into one reply text plus the cost of the call.
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The prompt and the requested reply format
    ///
    /// # Returns
    /// * `Result<Completion, ProviderError>` - The reply and its cost, or an error
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Human readable provider name
    fn name(&self) -> &str;

    /// Model used for every request
    fn model(&self) -> &str;
}

/// Build an HTTP client honouring an optional request timeout
pub(crate) fn http_client(timeout_secs: Option<u64>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().unwrap_or_default()
}

/// Create the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Result<Box<dyn Provider>, AppError> {
    let model = config.get_model();
    let endpoint = config.get_endpoint();
    let (prompt_price, completion_price) = config.get_pricing();
    let pricing = Pricing::new(prompt_price, completion_price);
    let temperature = config.common.temperature;
    let timeout = config.get_timeout_secs();

    url::Url::parse(&endpoint).map_err(|e| {
        AppError::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e))
    })?;

    let provider: Box<dyn Provider> = match config.provider {
        TranslationProvider::OpenRouter
        | TranslationProvider::OpenAI
        | TranslationProvider::LMStudio => Box::new(
            openai::OpenAICompatible::new(
                config.provider.display_name(),
                endpoint,
                config.get_api_key(),
                model,
                timeout,
            )
            .with_pricing(pricing)
            .with_temperature(temperature),
        ),
        TranslationProvider::Anthropic => Box::new(
            anthropic::Anthropic::new(config.get_api_key(), endpoint, model, timeout)
                .with_pricing(pricing)
                .with_temperature(temperature),
        ),
        TranslationProvider::Ollama => Box::new(
            ollama::Ollama::new(endpoint, model, timeout)
                .with_pricing(pricing)
                .with_temperature(temperature),
        ),
    };

    Ok(provider)
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
