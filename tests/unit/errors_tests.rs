/*!
 * Tests for error types
 */

use dialogai::errors::{AppError, ProviderError, TranslationError};

#[test]
fn test_providerError_fromStatus_shouldPickVariant() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key"),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down"),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "boom"),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_translationError_display_shouldDescribeFailure() {
    let exhausted = TranslationError::RetryExhausted {
        attempts: 10,
        last_failure: "shape [1] instead of [2]".to_string(),
    };
    assert_eq!(
        exhausted.to_string(),
        "Gave up after 10 attempts: shape [1] instead of [2]"
    );

    let ceiling = TranslationError::CostCeilingExceeded {
        spent: 0.6,
        ceiling: 0.5,
    };
    assert_eq!(
        ceiling.to_string(),
        "Cost ceiling exceeded: $0.6000 spent, ceiling is $0.5000"
    );
}

#[test]
fn test_appError_isCancellation_shouldOnlyMatchCancelled() {
    assert!(AppError::from(TranslationError::Cancelled).is_cancellation());
    assert!(!AppError::Configuration("missing key".to_string()).is_cancellation());
    assert!(!AppError::from(TranslationError::MalformedResponse("x".to_string())).is_cancellation());
}

#[test]
fn test_errorConversions_shouldWrapSources() {
    let provider: TranslationError = ProviderError::ConnectionError("refused".to_string()).into();
    assert!(matches!(provider, TranslationError::Provider(ProviderError::ConnectionError(_))));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let translation: TranslationError = json_error.into();
    assert!(matches!(translation, TranslationError::MalformedResponse(_)));

    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io_error), AppError::File(_)));
}
