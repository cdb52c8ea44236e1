/*!
 * Tests for error types and conversions
 */

use vttflow::errors::{AppError, ProviderError, SubtitleError, TranslationError};

#[test]
fn test_provider_error_is_retryable_shouldOnlyRetryTransientFailures() {
    assert!(ProviderError::ConnectionError("reset".into()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".into()).is_retryable());
    assert!(ProviderError::ApiError { status_code: 503, message: "busy".into() }.is_retryable());

    assert!(!ProviderError::ApiError { status_code: 400, message: "bad".into() }.is_retryable());
    assert!(!ProviderError::AuthenticationError("key".into()).is_retryable());
    assert!(!ProviderError::ParseError("json".into()).is_retryable());
}

#[test]
fn test_translation_error_fromProviderError_shouldWrapMessage() {
    let error: TranslationError = ProviderError::ConnectionError("refused".into()).into();
    assert!(matches!(error, TranslationError::Provider(_)));
    assert_eq!(error.to_string(), "Provider error: Connection error: refused");
}

#[test]
fn test_translation_error_display_shouldNameTheGroup() {
    let error = TranslationError::EmptyTranslation { group_index: 7 };
    assert_eq!(error.to_string(), "Translation for group 7 is empty");
    assert_eq!(TranslationError::AllGroupsFailed(3).to_string(), "All 3 sentence groups failed to translate");
}

#[test]
fn test_app_error_conversions_shouldPickMatchingVariant() {
    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_subtitle: AppError = SubtitleError::NoCues("talk.vtt".into()).into();
    assert_eq!(from_subtitle.to_string(), "Subtitle error: No subtitle cues found in talk.vtt");

    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert!(matches!(from_anyhow, AppError::Unknown(message) if message == "boom"));
}
