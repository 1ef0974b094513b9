use anyhow::{Context, anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    pub target_language: String,

    /// Qualifier placed before the language name in prompts (e.g. "Classical")
    #[serde(default)]
    pub language_variant: Option<String>,

    /// Title of the game whose dialogue is translated
    #[serde(default = "default_game_title")]
    pub game_title: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenRouter (OpenAI-compatible, reports cost per call)
    #[default]
    OpenRouter,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenRouter => "OpenRouter",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenRouter => "openrouter".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable holding the API key, if the provider needs one
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key (falls back to the provider's environment variable)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds, none waits indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    // @field: Price per million prompt tokens, used when the API reports no cost
    #[serde(default)]
    pub prompt_price_per_million: f64,

    // @field: Price per million completion tokens
    #[serde(default)]
    pub completion_price_per_million: f64,

    // @field: Ask the server for JSON output; off for servers that reject it
    #[serde(default = "default_true")]
    pub json_mode: bool,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: None,
            prompt_price_per_million: 0.0,
            completion_price_per_million: 0.0,
            json_mode: true,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Temperature parameter for text generation, provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum model calls for a single dialogue before the run is aborted
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Number of preceding dialogues of the same file shown as context
    #[serde(default = "default_context_dialogues")]
    pub context_dialogues: usize,

    /// Lines must stay under this many characters for portrait-less speech ("NP")
    #[serde(default = "default_np_line_limit")]
    pub np_line_limit: usize,

    /// Lines must stay under this many characters when a portrait is shown
    #[serde(default = "default_portrait_line_limit")]
    pub portrait_line_limit: usize,

    /// Whether the game can only render ASCII text
    #[serde(default = "default_true")]
    pub ascii_only: bool,

    /// Abort a dialogue once its attempts cost more than this (disabled when unset)
    #[serde(default)]
    pub max_cost_per_dialogue: Option<f64>,

    /// Extra instructions appended to every dialogue prompt
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            temperature: None,
            max_attempts: default_max_attempts(),
            context_dialogues: default_context_dialogues(),
            np_line_limit: default_np_line_limit(),
            portrait_line_limit: default_portrait_line_limit(),
            ascii_only: true,
            max_cost_per_dialogue: None,
            custom_instructions: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_game_title() -> String {
    "Cave Story".to_string()
}

fn default_max_attempts() -> usize {
    10
}

fn default_context_dialogues() -> usize {
    3
}

fn default_np_line_limit() -> usize {
    34
}

fn default_portrait_line_limit() -> usize {
    27
}

fn default_true() -> bool {
    true
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenRouter => "https://openrouter.ai/api/v1".to_string(),
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::OpenRouter => "google/gemini-3-flash-preview".to_string(),
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        TranslationProvider::Anthropic => "claude-3-5-haiku-latest".to_string(),
        TranslationProvider::Ollama => "gemma3:4b".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        crate::language_utils::get_language_name(&self.target_language)
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let common = &self.translation.common;
        if common.max_attempts == 0 {
            return Err(AppError::Configuration("max_attempts must be at least 1".to_string()));
        }
        if common.np_line_limit == 0 || common.portrait_line_limit == 0 {
            return Err(AppError::Configuration("Line limits must be greater than zero".to_string()));
        }
        if let Some(ceiling) = common.max_cost_per_dialogue {
            if ceiling <= 0.0 {
                return Err(AppError::Configuration(
                    "max_cost_per_dialogue must be positive when set".to_string(),
                ));
            }
        }

        if let Some(env_var) = self.translation.provider.api_key_env_var() {
            if self.translation.get_api_key().is_empty() {
                return Err(AppError::Configuration(format!(
                    "{} environment variable must be set (or api_key configured) for the {} provider.",
                    env_var,
                    self.translation.provider.display_name()
                )));
            }
        }

        Ok(())
    }

    /// Read a config file, or `None` when it does not exist yet
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(Some(config))
    }

    /// Load the config at `path`, apply `overrides` and validate the result.
    ///
    /// A missing file is replaced by the defaults, which are written to `path`
    /// only once the overridden configuration has passed validation.
    pub fn load_validated<P, F>(path: P, overrides: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut Config),
    {
        let path = path.as_ref();
        let stored = Self::from_file(path)?;
        let missing = stored.is_none();

        let mut config = stored.unwrap_or_default();
        overrides(&mut config);
        config.validate().context("Configuration validation failed")?;

        if missing {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config_json = serde_json::to_string_pretty(&Config::default())
                .context("Failed to serialize default config to JSON")?;
            FileManager::write_to_file(path, &config_json)
                .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        }

        Ok(config)
    }

    /// Name of the target language as written in prompts
    pub fn target_language_name(&self) -> Result<String> {
        crate::language_utils::prompt_language_name(
            &self.target_language,
            self.language_variant.as_deref(),
        )
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: "la".to_string(),
            language_variant: Some("Classical".to_string()),
            game_title: default_game_title(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a mutable handle on the active provider configuration, adding a default one if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(index) = self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            return &mut self.available_providers[index];
        }
        self.available_providers.push(ProviderConfig::new(self.provider.clone()));
        let last = self.available_providers.len() - 1;
        &mut self.available_providers[last]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        match self.get_active_provider_config() {
            Some(provider_config) if !provider_config.model.is_empty() => provider_config.model.clone(),
            _ => default_model(&self.provider),
        }
    }

    /// Get the API key for the active provider, from config or environment
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        match self.get_active_provider_config() {
            Some(provider_config) if !provider_config.endpoint.is_empty() => {
                provider_config.endpoint.clone()
            }
            _ => default_endpoint(&self.provider),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> Option<u64> {
        self.get_active_provider_config()
            .and_then(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
    }

    /// Get the token prices (prompt, completion) per million tokens
    pub fn get_pricing(&self) -> (f64, f64) {
        self.get_active_provider_config()
            .map(|p| (p.prompt_price_per_million, p.completion_price_per_million))
            .unwrap_or((0.0, 0.0))
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: TranslationProvider::default(),
            available_providers: Vec::new(),
            common: TranslationCommonConfig::default(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(TranslationProvider::OpenRouter));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::OpenAI));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Anthropic));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Ollama));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::LMStudio));

        config
    }
}
