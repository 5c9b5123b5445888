//! Property records and the vector store abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A property record returned by the vector store, ranked by similarity
/// to the query embedding. Read-only to the pipeline: included in context
/// verbatim, never re-ranked or deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyMatch {
    /// Property name.
    pub name: String,

    /// Street address.
    pub address: String,

    /// Kind of property (apartment, detached house, ...).
    pub property_type: String,

    /// Purchase price in yen, if recorded.
    pub purchase_price: Option<f64>,

    /// Monthly rent in yen, if recorded.
    pub monthly_rent: Option<f64>,

    /// Purchase date as stored (ISO date string).
    pub purchase_date: String,

    /// Cosine similarity to the query embedding, in [0, 1].
    pub similarity: f32,
}

/// The vector similarity store: holds per-property embeddings and answers
/// "nearest K above threshold".
///
/// Results come back sorted by descending similarity, at most `limit`
/// entries, each with `similarity >= threshold`. An empty result is valid
/// and distinct from an error.
#[async_trait]
pub trait PropertyIndex: Send + Sync {
    /// A human-readable name for this store (e.g., "rpc", "memory").
    fn name(&self) -> &str;

    /// Search for properties similar to the query embedding.
    async fn search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<PropertyMatch>, ProviderError>;
}
