//! OpenAI-compatible backend implementation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any
//! endpoint exposing the OpenAI wire format.
//!
//! Supports:
//! - Embeddings (unary, one text per call)
//! - Streaming chat completions (SSE)
//!
//! Every remote call carries an explicit upper bound: unary calls time out
//! as a whole, streams time out per chunk of idle time.

use async_trait::async_trait;
use futures::StreamExt;
use rentier_core::error::ProviderError;
use rentier_core::provider::{
    CompletionChunk, CompletionProvider, CompletionRequest, EmbeddingProvider,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// An OpenAI-compatible embedding + completion backend.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    embedding_model: String,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            embedding_model: "text-embedding-3-small".into(),
            request_timeout: Duration::from_secs(30),
            client,
        }
    }

    /// Create an OpenAI backend (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Build a backend from application configuration.
    pub fn from_config(config: &rentier_config::AppConfig) -> Self {
        Self::new(
            "openai",
            &config.api_url,
            config.api_key.clone().unwrap_or_default(),
        )
        .with_embedding_model(&config.embedding_model)
        .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    /// Set the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the remote-call upper bound (whole call for unary requests,
    /// per-chunk idle time for streams).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Map a non-200 status to a typed error, consuming the response body.
    async fn status_error(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        match status {
            429 => ProviderError::RateLimited { retry_after_secs: 5 },
            401 | 403 => ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            404 => {
                let body = response.text().await.unwrap_or_default();
                ProviderError::ModelNotFound(body)
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!(status, body = %body, "Backend returned error");
                ProviderError::ApiError {
                    status_code: status,
                    message: body,
                }
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": [text],
            "encoding_format": "float",
        });

        debug!(backend = %self.name, model = %self.embedding_model, "Sending embedding request");

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!(
                        "embedding call exceeded {}s",
                        self.request_timeout.as_secs()
                    ))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        if response.status().as_u16() != 200 {
            return Err(Self::status_error(response).await);
        }

        let api_resp: EmbeddingApiResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("embedding response did not parse: {e}"))
        })?;

        let vector = api_resp
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("embedding response contained no vectors".into())
            })?;

        if vector.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "embedding vector was empty".into(),
            ));
        }

        Ok(vector)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream(
        &self,
        request: CompletionRequest,
    ) -> Result<
        tokio::sync::mpsc::Receiver<Result<CompletionChunk, ProviderError>>,
        ProviderError,
    > {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
            "stream": true,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(backend = %self.name, model = %request.model, "Sending streaming request");

        // Bound the time to response headers; the body is bounded per chunk below.
        let send = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send();

        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "no completion response within {}s",
                    self.request_timeout.as_secs()
                ))
            })?
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if response.status().as_u16() != 200 {
            return Err(Self::status_error(response).await);
        }

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let idle_timeout = self.request_timeout;

        // Spawn a task to read the SSE byte stream and parse chunks.
        // Sends fail once the receiver is dropped; the task returns and the
        // response (and its connection) are released.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            loop {
                let chunk_result =
                    match tokio::time::timeout(idle_timeout, byte_stream.next()).await {
                        Ok(Some(r)) => r,
                        Ok(None) => break,
                        Err(_) => {
                            let _ = tx
                                .send(Err(ProviderError::Timeout(format!(
                                    "no completion chunk within {}s",
                                    idle_timeout.as_secs()
                                ))))
                                .await;
                            return;
                        }
                    };

                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                // Frame on raw bytes: a multi-byte character split across
                // network chunks must be reassembled before any decoding.
                buffer.extend_from_slice(&bytes);

                // Process complete lines
                while let Some(line) = next_line(&mut buffer) {
                    // Skip empty lines and SSE comments
                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    let data = data.trim();

                    // "[DONE]" signals end of stream
                    if data == "[DONE]" {
                        let _ = tx
                            .send(Ok(CompletionChunk {
                                delta: None,
                                done: true,
                            }))
                            .await;
                        return;
                    }

                    let parsed: StreamResponse = match serde_json::from_str(data) {
                        Ok(p) => p,
                        Err(e) => {
                            let _ = tx
                                .send(Err(ProviderError::MalformedResponse(format!(
                                    "unparseable SSE frame: {e}"
                                ))))
                                .await;
                            return;
                        }
                    };

                    let Some(choice) = parsed.choices.first() else {
                        continue;
                    };

                    let has_content = choice.delta.content.as_ref().is_some_and(|c| !c.is_empty());
                    if has_content {
                        let chunk = CompletionChunk {
                            delta: choice.delta.content.clone(),
                            done: false,
                        };
                        if tx.send(Ok(chunk)).await.is_err() {
                            return; // receiver dropped
                        }
                    }
                }
            }

            // Stream ended without [DONE]
            let _ = tx
                .send(Ok(CompletionChunk {
                    delta: None,
                    done: true,
                }))
                .await;
        });

        Ok(rx)
    }
}

/// Pop the next complete line (terminator stripped) off the byte buffer.
///
/// SSE lines are framed on the raw byte stream; decoding happens only on
/// complete lines, so a UTF-8 sequence that straddles a network chunk
/// boundary stays intact.
fn next_line(buffer: &mut Vec<u8>) -> Option<String> {
    let newline = buffer.iter().position(|&b| b == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=newline).collect();
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Some(String::from_utf8_lossy(&line).into_owned())
}

// --- Embedding API types ---

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

// --- Streaming SSE types ---

/// A single SSE `data: {...}` chunk from a streaming completion.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[serde(default)]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
