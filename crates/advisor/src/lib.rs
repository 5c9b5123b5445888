//! The advisor pipeline — the heart of Rentier.
//!
//! One request flows through a fixed sequence:
//!
//! 1. **Validate** the question (empty after trim → rejected)
//! 2. **Embed** the question via the embedding provider
//! 3. **Retrieve** similar properties from the vector store
//! 4. **Assemble** context (matches + transaction summary + static knowledge)
//! 5. **Render** the fixed prompt template
//! 6. **Stream** the completion back chunk by chunk
//!
//! Every stage is single-pass with no retries; failures map onto
//! [`rentier_core::AdvisorError`] by stage.

pub mod assembler;
pub mod knowledge;
pub mod pipeline;
pub mod prompt;
pub mod summary;

pub use assembler::{ContextAssembler, NO_MATCH_SENTINEL, SECTION_SEPARATOR};
pub use knowledge::KnowledgeBase;
pub use pipeline::{AdvisorPipeline, AnswerStream};
pub use prompt::REFUSAL_PHRASE;
pub use summary::{NO_TRANSACTIONS_SENTINEL, UNCATEGORIZED_LABEL, summarize_transactions};

#[cfg(test)]
pub(crate) mod test_helpers;
