//! Provider traits — abstractions over the embedding and completion backends.
//!
//! Both are consumed as opaque remote calls: the pipeline never inspects
//! vectors beyond passing them to the store, and completion output is relayed
//! chunk-by-chunk without buffering.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A completion request: one rendered prompt, no conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gpt-4o-mini").
    pub model: String,

    /// The fully rendered prompt text.
    pub prompt: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A single chunk in a streaming completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChunk {
    /// Partial content delta.
    #[serde(default)]
    pub delta: Option<String>,

    /// Whether this is the final chunk.
    #[serde(default)]
    pub done: bool,
}

/// Converts text into a fixed-length vector for similarity search.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai").
    fn name(&self) -> &str;

    /// Embed a single text. The vector dimensionality is determined by the
    /// backend; the pipeline treats it as opaque.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Streams a natural-language completion for a rendered prompt.
///
/// The receiver yields chunks strictly in provider delivery order. Dropping
/// the receiver cancels the stream and releases the upstream connection.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Start a streaming completion.
    async fn stream(
        &self,
        request: CompletionRequest,
    ) -> Result<
        tokio::sync::mpsc::Receiver<Result<CompletionChunk, ProviderError>>,
        ProviderError,
    >;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_serializes_without_max_tokens() {
        let req = CompletionRequest {
            model: "gpt-4o-mini".into(),
            prompt: "こんにちは".into(),
            temperature: 0.2,
            max_tokens: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("max_tokens"));
        assert!(json.contains("こんにちは"));
    }

    #[test]
    fn completion_chunk_defaults() {
        let chunk: CompletionChunk = serde_json::from_str("{}").unwrap();
        assert!(chunk.delta.is_none());
        assert!(!chunk.done);
    }
}
