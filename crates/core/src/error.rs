//! Error types for the rentier domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Errors from external backends: embedding, completion, and the vector store.
///
/// Retry/backoff is deliberately not handled here — the pipeline propagates
/// these verbatim and the caller decides.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Malformed provider payload: {0}")]
    MalformedResponse(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the advisor pipeline, one variant per failable stage.
///
/// `EmptyQuestion` is user-correctable (4xx-equivalent); the rest surface as
/// 5xx-equivalent when they occur before streaming starts.
#[derive(Debug, Clone, Error)]
pub enum AdvisorError {
    #[error("question is required")]
    EmptyQuestion,

    #[error("Embedding failed: {0}")]
    Embedding(ProviderError),

    #[error("Retrieval failed: {0}")]
    Retrieval(ProviderError),

    #[error("Completion failed: {0}")]
    Completion(ProviderError),
}

impl AdvisorError {
    /// The pipeline stage this error belongs to, for log correlation.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::EmptyQuestion => "validating",
            Self::Embedding(_) => "embedding",
            Self::Retrieval(_) => "retrieving",
            Self::Completion(_) => "streaming",
        }
    }

    /// Whether the failure is the caller's fault (maps to a 4xx response).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::EmptyQuestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_status() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn advisor_error_stages() {
        assert_eq!(AdvisorError::EmptyQuestion.stage(), "validating");
        assert_eq!(
            AdvisorError::Embedding(ProviderError::Timeout("embed".into())).stage(),
            "embedding"
        );
        assert_eq!(
            AdvisorError::Retrieval(ProviderError::Network("down".into())).stage(),
            "retrieving"
        );
        assert_eq!(
            AdvisorError::Completion(ProviderError::StreamInterrupted("eof".into())).stage(),
            "streaming"
        );
    }

    #[test]
    fn only_empty_question_is_rejection() {
        assert!(AdvisorError::EmptyQuestion.is_rejection());
        assert!(!AdvisorError::Embedding(ProviderError::Timeout("t".into())).is_rejection());
    }
}
