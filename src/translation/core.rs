/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService, the single gateway every
 * model call of a run goes through. It races each call against the run's
 * cancellation token and keeps usage statistics for the final report.
 */

use log::debug;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::TranslationConfig;
use crate::errors::{AppError, TranslationError};
use crate::providers::{self, Completion, CompletionRequest, Provider, ResponseFormat};

/// Usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct UsageStats {
    /// Number of answered calls
    pub calls: usize,

    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total cost of answered calls
    pub cost: f64,

    /// Start time of tracking
    pub start_time: Instant,

    /// Total time spent waiting on the API
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl UsageStats {
    /// Create new usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            calls: 0,
            prompt_tokens: 0,
            completion_tokens: 0,
            cost: 0.0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Record one answered call
    pub fn record(&mut self, completion: &Completion, elapsed: Duration) {
        self.calls += 1;
        self.prompt_tokens += completion.prompt_tokens.unwrap_or(0);
        self.completion_tokens += completion.completion_tokens.unwrap_or(0);
        self.cost += completion.cost;
        self.api_duration += elapsed;
    }

    /// Generate a summary of usage
    pub fn summary(&self) -> String {
        format!(
            "Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Calls: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Cost: ${:.4}\n\
             Time waiting on API: {:.1}s of {:.1}s",
            self.provider,
            self.model,
            self.calls,
            self.prompt_tokens,
            self.completion_tokens,
            self.cost,
            self.api_duration.as_secs_f64(),
            self.start_time.elapsed().as_secs_f64()
        )
    }
}

/// Gateway to the configured model
pub struct TranslationService {
    /// Provider answering the calls
    provider: Box<dyn Provider>,

    /// Fired when the user interrupts the run
    cancel: CancellationToken,

    /// Usage statistics
    usage: Mutex<UsageStats>,

    /// When off, JSON requests go out as free text and only the prompt asks for JSON
    json_mode: bool,
}

impl TranslationService {
    /// Create a service around an existing provider
    pub fn new(provider: Box<dyn Provider>, cancel: CancellationToken) -> Self {
        let usage = UsageStats::with_provider_info(
            provider.name().to_string(),
            provider.model().to_string(),
        );
        Self {
            provider,
            cancel,
            usage: Mutex::new(usage),
            json_mode: true,
        }
    }

    /// Enable or disable the server-side JSON output mode
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// Create a service for the provider selected in the configuration
    pub fn from_config(config: &TranslationConfig, cancel: CancellationToken) -> Result<Self, AppError> {
        let provider = providers::create_provider(config)?;
        let json_mode = config.get_active_provider_config().is_none_or(|p| p.json_mode);
        Ok(Self::new(provider, cancel).with_json_mode(json_mode))
    }

    /// Send one request, unless the run is cancelled first
    ///
    /// # Returns
    /// * The reply and its cost, `TranslationError::Provider` on transport
    ///   failure, or `TranslationError::Cancelled` if the token fires while waiting
    pub async fn request(&self, mut request: CompletionRequest) -> Result<Completion, TranslationError> {
        if self.cancel.is_cancelled() {
            return Err(TranslationError::Cancelled);
        }
        if !self.json_mode {
            request.format = ResponseFormat::Text;
        }

        debug!("Prompt ({} chars):\n{}", request.prompt.len(), request.prompt);
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(TranslationError::Cancelled),
            result = self.provider.complete(request) => result,
        };

        let completion = result?;
        debug!("Reply (${:.6}):\n{}", completion.cost, completion.text);
        self.usage.lock().record(&completion, started.elapsed());
        Ok(completion)
    }

    /// Snapshot of the usage so far
    pub fn usage(&self) -> UsageStats {
        self.usage.lock().clone()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }
}
