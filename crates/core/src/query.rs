//! The caller's input: a question plus their raw transaction list.

use serde::{Deserialize, Serialize};

/// One advisor request, as submitted by the caller.
///
/// The transaction list is the caller's own accounting data for the period
/// they are asking about; it is summarized into context, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorQuery {
    /// The user's question. Must be non-empty after trimming.
    pub question: String,

    /// The caller's transactions, in the order they were recorded.
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

/// A single income or expense entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Category label. `None` renders under the uncategorized label.
    #[serde(default)]
    pub category: Option<String>,

    /// Amount in yen. Income positive, expenses as recorded by the caller.
    pub amount: f64,
}

impl AdvisorQuery {
    /// Whether the question is present after trimming whitespace.
    pub fn has_question(&self) -> bool {
        !self.question.trim().is_empty()
    }
}
