use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Pricing, Provider, ResponseFormat, http_client};

/// Client for OpenAI-compatible chat completion APIs (OpenRouter, OpenAI, LM Studio)
#[derive(Debug)]
pub struct OpenAICompatible {
    /// Provider name used in logs
    name: String,
    /// HTTP client for API requests
    client: Client,
    /// Base URL, e.g. `https://openrouter.ai/api/v1`
    endpoint: String,
    /// Bearer token, may be empty for local servers
    api_key: String,
    /// Model identifier
    model: String,
    /// Fallback prices when the API reports no cost
    pricing: Pricing,
    /// Sampling temperature, provider default when unset
    temperature: Option<f32>,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    pub model: String,

    /// The messages for the conversation
    pub messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Requested reply format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormatSpec>,
}

/// `{"type": "json_object"}`
#[derive(Debug, Serialize, PartialEq)]
pub struct ResponseFormatSpec {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Token usage information, with the billed cost when the API reports it
#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    /// Reported by OpenRouter, in credits (dollars)
    #[serde(default)]
    pub cost: Option<f64>,
}

impl OpenAICompatible {
    /// Create a new client
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            name: name.into(),
            client: http_client(timeout_secs),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            pricing: Pricing::default(),
            temperature: None,
        }
    }

    /// Set token prices used when the API reports no cost
    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Full URL of the chat completions route
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Build the wire request for one prompt
    pub fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(request.prompt.clone()),
            }],
            temperature: self.temperature,
            response_format: match request.format {
                ResponseFormat::Json => Some(ResponseFormatSpec {
                    format_type: "json_object".to_string(),
                }),
                ResponseFormat::Text => None,
            },
        }
    }

    /// Turn a wire response into a completion, pricing it if needed
    pub fn into_completion(
        response: ChatCompletionResponse,
        pricing: &Pricing,
    ) -> Result<Completion, ProviderError> {
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::EmptyResponse("no message content in reply".to_string()))?;

        let (prompt_tokens, completion_tokens, reported_cost) = match response.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens, usage.cost),
            None => (None, None, None),
        };

        Ok(Completion {
            text,
            cost: reported_cost.unwrap_or_else(|| pricing.cost(prompt_tokens, completion_tokens)),
            prompt_tokens,
            completion_tokens,
        })
    }
}

#[async_trait]
impl Provider for OpenAICompatible {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let body = self.build_request(&request);
        debug!("Sending request to {} ({})", self.name, self.model);

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", self.name, status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Self::into_completion(parsed, &self.pricing)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}
