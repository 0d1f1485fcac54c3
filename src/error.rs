//! Error types for Bolt Responder.

use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Message returned when the request carries no usable `body`.
pub const NO_TEXT_PROVIDED: &str = "No text provided";

/// Message returned when the classifier answers in a shape we cannot read.
pub const UNEXPECTED_CLASSIFIER_RESPONSE: &str = "Unexpected response from classifier";

/// Fallback message for errors whose text is empty.
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the external intent classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier {backend} request failed: {reason}")]
    RequestFailed { backend: String, reason: String },

    #[error("Classifier {backend} returned HTTP {status}: {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from classifier")]
    UnexpectedResponse,

    #[error("Classifier timed out after {after:?}")]
    Timeout { after: Duration },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider {provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single analyze request.
///
/// Every variant renders as `{"Error": message}`; only `Client` maps to 400.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// Malformed or incomplete input.
    #[error("{0}")]
    Client(String),

    /// The classifier answered with a shape we cannot interpret.
    #[error("Unexpected response from classifier")]
    UpstreamFormat,

    /// Network or service failure from the classifier or the generator.
    #[error("{0}")]
    UpstreamCall(String),

    #[error("{0}")]
    Unknown(String),
}

impl AnalyzeError {
    pub fn no_text() -> Self {
        Self::Client(NO_TEXT_PROVIDED.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Client(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; never empty.
    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_SERVER_ERROR.to_string()
        } else {
            message
        }
    }
}

impl From<ClassifierError> for AnalyzeError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::UnexpectedResponse => Self::UpstreamFormat,
            other => Self::UpstreamCall(other.to_string()),
        }
    }
}

impl From<LlmError> for AnalyzeError {
    fn from(err: LlmError) -> Self {
        Self::UpstreamCall(err.to_string())
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Analyze request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Analyze request rejected");
        }
        (status, Json(serde_json::json!({ "Error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_is_bad_request() {
        let err = AnalyzeError::no_text();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), NO_TEXT_PROVIDED);
    }

    #[test]
    fn unexpected_classifier_response_maps_to_format_error() {
        let err: AnalyzeError = ClassifierError::UnexpectedResponse.into();
        assert!(matches!(err, AnalyzeError::UpstreamFormat));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), UNEXPECTED_CLASSIFIER_RESPONSE);
    }

    #[test]
    fn classifier_transport_failure_keeps_underlying_text() {
        let err: AnalyzeError = ClassifierError::Status {
            backend: "space".into(),
            status: 503,
            body: "loading".into(),
        }
        .into();
        assert!(matches!(err, AnalyzeError::UpstreamCall(_)));
        assert_eq!(err.message(), "Classifier space returned HTTP 503: loading");
    }

    #[test]
    fn llm_failure_is_upstream_call() {
        let err: AnalyzeError = LlmError::AuthFailed {
            provider: "gemini".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Authentication failed for provider gemini");
    }

    #[test]
    fn empty_message_falls_back() {
        assert_eq!(
            AnalyzeError::Unknown(String::new()).message(),
            UNKNOWN_SERVER_ERROR
        );
        assert_eq!(
            AnalyzeError::UpstreamCall("  ".into()).message(),
            UNKNOWN_SERVER_ERROR
        );
    }
}
