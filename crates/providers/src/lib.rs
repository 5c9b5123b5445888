//! Embedding and completion backends for rentier.
//!
//! One client covers both concerns: most hosted model APIs expose
//! OpenAI-compatible `/embeddings` and `/chat/completions` endpoints, so a
//! single `OpenAiCompatProvider` implements `EmbeddingProvider` and
//! `CompletionProvider` against any of them.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
