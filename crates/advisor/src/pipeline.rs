//! The advisor pipeline — orchestration of one request.
//!
//! Each request runs a single pass through a fixed stage sequence:
//!
//! ```text
//! RECEIVED -> VALIDATING -> EMBEDDING -> RETRIEVING -> ASSEMBLING
//!          -> RENDERING -> STREAMING -> DONE
//! ```
//!
//! Validation failure rejects the request before any provider call; a
//! provider failure in EMBEDDING, RETRIEVING, or completion-request setup
//! fails the whole request with nothing sent. Once STREAMING has begun,
//! chunks are forwarded as received and a mid-stream provider error is
//! logged and terminates the stream — bytes already forwarded cannot be
//! retracted. There are no retries across stages.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rentier_config::AppConfig;
use rentier_core::error::AdvisorError;
use rentier_core::property::{PropertyIndex, PropertyMatch};
use rentier_core::provider::{CompletionProvider, CompletionRequest, EmbeddingProvider};
use rentier_core::query::AdvisorQuery;

use crate::assembler::ContextAssembler;
use crate::knowledge::KnowledgeBase;
use crate::prompt;

/// Answer chunks flowing back to the caller, in provider order.
///
/// The channel is bounded, so a slow caller throttles consumption of the
/// provider stream instead of buffering the whole completion.
pub type AnswerStream = mpsc::Receiver<String>;

const ANSWER_CHANNEL_CAPACITY: usize = 64;

/// Request stages, used for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validating,
    Embedding,
    Retrieving,
    Assembling,
    Rendering,
    Streaming,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Embedding => "embedding",
            Stage::Retrieving => "retrieving",
            Stage::Assembling => "assembling",
            Stage::Rendering => "rendering",
            Stage::Streaming => "streaming",
        }
    }
}

/// Orchestrates embed → retrieve → assemble → render → stream for each
/// query. All shared state is read-only behind `Arc`, so one pipeline
/// instance serves concurrent requests.
pub struct AdvisorPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    completer: Arc<dyn CompletionProvider>,
    index: Arc<dyn PropertyIndex>,
    assembler: ContextAssembler,
    chat_model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    threshold: f32,
    limit: usize,
}

impl AdvisorPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
        index: Arc<dyn PropertyIndex>,
        knowledge: Arc<KnowledgeBase>,
        config: &AppConfig,
    ) -> Self {
        Self {
            embedder,
            completer,
            index,
            assembler: ContextAssembler::new(knowledge),
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
            threshold: config.retrieval.threshold,
            limit: config.retrieval.limit,
        }
    }

    /// Run one query through the full pipeline.
    ///
    /// Returns the answer stream once the completion provider has accepted
    /// the request; every failure before that point surfaces here as an
    /// error with zero bytes sent to the caller.
    pub async fn run(&self, query: AdvisorQuery) -> Result<AnswerStream, AdvisorError> {
        let correlation_id = Uuid::new_v4();

        // ── VALIDATING ──
        if !query.has_question() {
            info!(
                %correlation_id,
                stage = Stage::Validating.as_str(),
                "Rejecting query with empty question"
            );
            return Err(AdvisorError::EmptyQuestion);
        }
        let question = query.question.trim();

        info!(
            %correlation_id,
            question_len = question.len(),
            transactions = query.transactions.len(),
            "Advisor query accepted"
        );

        // ── EMBEDDING / RETRIEVING ──
        let matches = self.retrieve_inner(question, correlation_id).await?;

        // ── ASSEMBLING ──
        debug!(%correlation_id, stage = Stage::Assembling.as_str(), hits = matches.len(), "Assembling context");
        let context = self
            .assembler
            .assemble(question, &query.transactions, &matches);

        // ── RENDERING ──
        debug!(%correlation_id, stage = Stage::Rendering.as_str(), context_len = context.len(), "Rendering prompt");
        let rendered = prompt::render(&context, question);

        let request = CompletionRequest {
            model: self.chat_model.clone(),
            prompt: rendered,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        // ── STREAMING ──
        let mut upstream = self
            .completer
            .stream(request)
            .await
            .inspect_err(|e| {
                warn!(%correlation_id, stage = Stage::Streaming.as_str(), error = %e, "Completion request failed");
            })
            .map_err(AdvisorError::Completion)?;

        info!(
            %correlation_id,
            stage = Stage::Streaming.as_str(),
            model = %self.chat_model,
            "Streaming answer"
        );

        let (tx, rx) = mpsc::channel::<String>(ANSWER_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut forwarded = 0usize;
            while let Some(item) = upstream.recv().await {
                match item {
                    Ok(chunk) => {
                        if let Some(delta) = chunk.delta {
                            if !delta.is_empty() {
                                // A closed receiver means the caller went
                                // away; stop and release the upstream.
                                if tx.send(delta).await.is_err() {
                                    debug!(%correlation_id, forwarded, "Caller disconnected, dropping stream");
                                    return;
                                }
                                forwarded += 1;
                            }
                        }
                        if chunk.done {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(
                            %correlation_id,
                            stage = Stage::Streaming.as_str(),
                            forwarded,
                            error = %e,
                            "Provider failed mid-stream, terminating answer"
                        );
                        return;
                    }
                }
            }
            debug!(%correlation_id, forwarded, "Answer stream complete");
        });

        Ok(rx)
    }

    /// Embed the question and search the property index.
    ///
    /// An empty hit list is a valid result, distinct from an error. Hits
    /// are returned exactly as the store ranked them.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<PropertyMatch>, AdvisorError> {
        self.retrieve_inner(question, Uuid::new_v4()).await
    }

    async fn retrieve_inner(
        &self,
        question: &str,
        correlation_id: Uuid,
    ) -> Result<Vec<PropertyMatch>, AdvisorError> {
        debug!(%correlation_id, stage = Stage::Embedding.as_str(), provider = self.embedder.name(), "Embedding question");
        let embedding = self
            .embedder
            .embed(question)
            .await
            .inspect_err(|e| {
                warn!(%correlation_id, stage = Stage::Embedding.as_str(), error = %e, "Embedding provider failed");
            })
            .map_err(AdvisorError::Embedding)?;

        debug!(
            %correlation_id,
            stage = Stage::Retrieving.as_str(),
            index = self.index.name(),
            dims = embedding.len(),
            threshold = self.threshold,
            limit = self.limit,
            "Searching property index"
        );
        let matches = self
            .index
            .search(&embedding, self.threshold, self.limit)
            .await
            .inspect_err(|e| {
                warn!(%correlation_id, stage = Stage::Retrieving.as_str(), error = %e, "Property search failed");
            })
            .map_err(AdvisorError::Retrieval)?;

        debug!(%correlation_id, hits = matches.len(), "Retrieval complete");
        Ok(matches)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
