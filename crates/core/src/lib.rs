//! # Rentier Core
//!
//! Domain types, traits, and error definitions for the rentier advisor
//! pipeline. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (embedding backend, completion backend, vector
//! store) is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod property;
pub mod provider;
pub mod query;

// Re-export key types at crate root for ergonomics
pub use error::{AdvisorError, ProviderError};
pub use property::{PropertyIndex, PropertyMatch};
pub use provider::{CompletionChunk, CompletionProvider, CompletionRequest, EmbeddingProvider};
pub use query::{AdvisorQuery, TransactionRecord};
