/*!
 * Error types for the dialogai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a model gateway
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The API answered without any text content
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model reply could not be read as the expected JSON
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// The attempt ceiling for one dialogue was hit
    #[error("Gave up after {attempts} attempts: {last_failure}")]
    RetryExhausted {
        /// Number of model calls made
        attempts: usize,
        /// Description of the last failed attempt
        last_failure: String,
    },

    /// Cost spent on a single dialogue passed the configured ceiling
    #[error("Cost ceiling exceeded: ${spent:.4} spent, ceiling is ${ceiling:.4}")]
    CostCeilingExceeded {
        /// Cost accumulated for the dialogue so far
        spent: f64,
        /// Configured ceiling
        ceiling: f64,
    },

    /// The user interrupted the run while a model call was pending
    #[error("Translation cancelled by user")]
    Cancelled,
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        Self::MalformedResponse(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing credential or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Input document or game script does not have the expected layout
    #[error("Document error: {0}")]
    Document(String),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}

impl AppError {
    /// Whether this error is a user interruption rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Translation(TranslationError::Cancelled))
    }
}

// Utility functions for error conversion
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Document(error.to_string())
    }
}
