//! Shared test helpers for pipeline tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use rentier_core::error::ProviderError;
use rentier_core::property::{PropertyIndex, PropertyMatch};
use rentier_core::provider::{
    CompletionChunk, CompletionProvider, CompletionRequest, EmbeddingProvider,
};

/// An embedding provider that returns one scripted result on every call.
pub struct ScriptedEmbedder {
    result: Result<Vec<f32>, ProviderError>,
    call_count: Mutex<usize>,
}

impl ScriptedEmbedder {
    pub fn returning(embedding: Vec<f32>) -> Self {
        Self {
            result: Ok(embedding),
            call_count: Mutex::new(0),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            result: Err(err),
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedEmbedder {
    fn name(&self) -> &str {
        "scripted_embedder"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        *self.call_count.lock().unwrap() += 1;
        self.result.clone()
    }
}

/// A property index that returns scripted hits and records the search
/// parameters it was called with.
pub struct ScriptedIndex {
    result: Result<Vec<PropertyMatch>, ProviderError>,
    last_call: Mutex<Option<(f32, usize)>>,
}

impl ScriptedIndex {
    pub fn returning(matches: Vec<PropertyMatch>) -> Self {
        Self {
            result: Ok(matches),
            last_call: Mutex::new(None),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            result: Err(err),
            last_call: Mutex::new(None),
        }
    }

    /// The `(threshold, limit)` of the most recent search, if any.
    pub fn last_call(&self) -> Option<(f32, usize)> {
        *self.last_call.lock().unwrap()
    }
}

#[async_trait]
impl PropertyIndex for ScriptedIndex {
    fn name(&self) -> &str {
        "scripted_index"
    }

    async fn search(
        &self,
        _embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<PropertyMatch>, ProviderError> {
        *self.last_call.lock().unwrap() = Some((threshold, limit));
        self.result.clone()
    }
}

/// A completion provider that plays back a scripted chunk sequence.
///
/// The script is consumed by the first `stream` call; a second call
/// panics. The request that triggered the stream is recorded for
/// assertions on the rendered prompt.
pub struct ScriptedCompleter {
    script: Mutex<Option<Vec<Result<CompletionChunk, ProviderError>>>>,
    failure: Option<ProviderError>,
    last_request: Mutex<Option<CompletionRequest>>,
    call_count: Mutex<usize>,
}

impl ScriptedCompleter {
    pub fn new(script: Vec<Result<CompletionChunk, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(Some(script)),
            failure: None,
            last_request: Mutex::new(None),
            call_count: Mutex::new(0),
        }
    }

    /// Script that streams the given text chunks then finishes cleanly.
    pub fn text_chunks(chunks: &[&str]) -> Self {
        let mut script: Vec<Result<CompletionChunk, ProviderError>> =
            chunks.iter().map(|c| Ok(text_chunk(c))).collect();
        script.push(Ok(done_chunk()));
        Self::new(script)
    }

    /// Provider whose `stream` call itself fails (request setup error).
    pub fn failing(err: ProviderError) -> Self {
        Self {
            script: Mutex::new(None),
            failure: Some(err),
            last_request: Mutex::new(None),
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompleter {
    fn name(&self) -> &str {
        "scripted_completer"
    }

    async fn stream(
        &self,
        request: CompletionRequest,
    ) -> Result<mpsc::Receiver<Result<CompletionChunk, ProviderError>>, ProviderError> {
        *self.last_request.lock().unwrap() = Some(request);
        *self.call_count.lock().unwrap() += 1;

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let script = self
            .script
            .lock()
            .unwrap()
            .take()
            .expect("ScriptedCompleter script already consumed");

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            for item in script {
                if tx.send(item).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }
}

/// A completion provider backed by a caller-held channel, for tests that
/// need to feed chunks while the pipeline is already streaming.
pub struct ChannelCompleter {
    receiver: Mutex<Option<mpsc::Receiver<Result<CompletionChunk, ProviderError>>>>,
}

impl ChannelCompleter {
    pub fn new(receiver: mpsc::Receiver<Result<CompletionChunk, ProviderError>>) -> Self {
        Self {
            receiver: Mutex::new(Some(receiver)),
        }
    }
}

#[async_trait]
impl CompletionProvider for ChannelCompleter {
    fn name(&self) -> &str {
        "channel_completer"
    }

    async fn stream(
        &self,
        _request: CompletionRequest,
    ) -> Result<mpsc::Receiver<Result<CompletionChunk, ProviderError>>, ProviderError> {
        Ok(self
            .receiver
            .lock()
            .unwrap()
            .take()
            .expect("ChannelCompleter stream already taken"))
    }
}

/// Collects formatted tracing output for assertions on emitted events.
#[derive(Clone)]
pub struct LogCapture(pub Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn text_chunk(text: &str) -> CompletionChunk {
    CompletionChunk {
        delta: Some(text.to_string()),
        done: false,
    }
}

pub fn done_chunk() -> CompletionChunk {
    CompletionChunk {
        delta: None,
        done: true,
    }
}

pub fn sample_match(name: &str, similarity: f32) -> PropertyMatch {
    PropertyMatch {
        name: name.to_string(),
        address: "東京都渋谷区恵比寿1-2-3".to_string(),
        property_type: "アパート".to_string(),
        purchase_price: Some(32_000_000.0),
        monthly_rent: Some(110_000.0),
        purchase_date: "2020-04-01".to_string(),
        similarity,
    }
}
