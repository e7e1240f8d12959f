use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    ConfigMissing,
    RateLimit,
    HttpError,
    InvalidResponse,
    NetworkError,
    UnknownError,
    AllProvidersFailed,
    Cancelled,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::ConfigMissing => "CONFIG_MISSING",
            Self::RateLimit => "RATE_LIMIT",
            Self::HttpError => "HTTP_ERROR",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::NetworkError => "NETWORK_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::AllProvidersFailed => "ALL_PROVIDERS_FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed provider attempt, normalized so callers never branch on provider identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct GenerationError {
    pub code: ErrorCode,
    pub message: String,
    pub provider: Option<String>,
}

impl GenerationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
        }
    }

    pub fn for_provider(
        code: ErrorCode,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn unknown(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::for_provider(ErrorCode::UnknownError, message, provider)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Fills in the provider name when the error does not carry one yet.
    pub fn with_default_provider(mut self, provider: &str) -> Self {
        if self.provider.is_none() {
            self.provider = Some(provider.to_string());
        }
        self
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::RateLimit | ErrorCode::NetworkError | ErrorCode::HttpError
        )
    }

    pub fn user_message(&self) -> String {
        match self.code {
            ErrorCode::InvalidInput => format!("Please review the generation input: {}", self.message),
            ErrorCode::ConfigMissing => {
                "The AI provider is not configured. Check its API key and base URL.".to_string()
            }
            ErrorCode::RateLimit => {
                "The AI provider is rate limiting requests. Please retry in a moment.".to_string()
            }
            ErrorCode::HttpError | ErrorCode::NetworkError => {
                format!("Could not reach the AI provider: {}", self.message)
            }
            ErrorCode::InvalidResponse => {
                format!("The AI provider returned an unusable response: {}", self.message)
            }
            ErrorCode::UnknownError
            | ErrorCode::AllProvidersFailed
            | ErrorCode::Cancelled => {
                format!("An internal error occurred while generating: {}", self.message)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("all AI providers failed ({} attempt(s))", .errors.len())]
    AllProvidersFailed { errors: Vec<GenerationError> },
    #[error("generation cancelled")]
    Cancelled { errors: Vec<GenerationError> },
}

impl OrchestrationError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::AllProvidersFailed { .. } => ErrorCode::AllProvidersFailed,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }

    /// Provider attempts recorded before the orchestrator gave up.
    pub fn errors(&self) -> &[GenerationError] {
        match self {
            Self::InvalidInput { .. } => &[],
            Self::AllProvidersFailed { errors } | Self::Cancelled { errors } => errors,
        }
    }

    /// HTTP status a route handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::AllProvidersFailed { .. } => 503,
            Self::Cancelled { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, GenerationError, OrchestrationError};

    #[test]
    fn error_code_serializes_as_screaming_snake_case() {
        let encoded = serde_json::to_string(&ErrorCode::AllProvidersFailed)
            .expect("error code should serialize");
        assert_eq!(encoded, "\"ALL_PROVIDERS_FAILED\"");
        assert_eq!(ErrorCode::RateLimit.to_string(), "RATE_LIMIT");

        let decoded: ErrorCode =
            serde_json::from_str("\"CONFIG_MISSING\"").expect("error code should deserialize");
        assert_eq!(decoded, ErrorCode::ConfigMissing);
    }

    #[test]
    fn with_default_provider_keeps_existing_provider() {
        let stamped = GenerationError::invalid_input("prompt must not be empty")
            .with_default_provider("groq");
        assert_eq!(stamped.provider(), Some("groq"));

        let kept = GenerationError::for_provider(ErrorCode::RateLimit, "slow down", "openrouter")
            .with_default_provider("groq");
        assert_eq!(kept.provider(), Some("openrouter"));
    }

    #[test]
    fn is_retryable_matches_transient_codes() {
        assert!(GenerationError::new(ErrorCode::RateLimit, "429").is_retryable());
        assert!(GenerationError::new(ErrorCode::NetworkError, "reset").is_retryable());
        assert!(!GenerationError::new(ErrorCode::ConfigMissing, "no key").is_retryable());
        assert!(!GenerationError::invalid_input("empty").is_retryable());
    }

    #[test]
    fn user_message_returns_actionable_message() {
        assert!(
            GenerationError::new(ErrorCode::ConfigMissing, "missing")
                .user_message()
                .contains("API key")
        );
        assert!(
            GenerationError::new(ErrorCode::InvalidResponse, "empty content")
                .user_message()
                .contains("empty content")
        );
    }

    #[test]
    fn orchestration_error_maps_status_codes() {
        let exhausted = OrchestrationError::AllProvidersFailed {
            errors: vec![GenerationError::for_provider(
                ErrorCode::HttpError,
                "Groq HTTP 500: boom",
                "groq",
            )],
        };
        assert_eq!(exhausted.code(), ErrorCode::AllProvidersFailed);
        assert_eq!(exhausted.status_code(), 503);
        assert_eq!(exhausted.errors().len(), 1);

        let invalid = OrchestrationError::invalid_input("prompt must not be empty");
        assert_eq!(invalid.code(), ErrorCode::InvalidInput);
        assert_eq!(invalid.status_code(), 400);
        assert!(invalid.errors().is_empty());
    }
}
