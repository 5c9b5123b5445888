//! In-memory property index.
//!
//! Holds property records with their embeddings and answers similarity
//! queries with pure-Rust cosine search. Records are registered at
//! construction and never mutated afterwards, so the index is freely
//! shareable across request tasks.

use async_trait::async_trait;

use rentier_core::error::ProviderError;
use rentier_core::property::{PropertyIndex, PropertyMatch};

use crate::vector::cosine_similarity;

/// A stored property record: the displayable fields plus its embedding.
#[derive(Debug, Clone)]
pub struct PropertyRecord {
    pub name: String,
    pub address: String,
    pub property_type: String,
    pub purchase_price: Option<f64>,
    pub monthly_rent: Option<f64>,
    pub purchase_date: String,
    pub embedding: Vec<f32>,
}

impl PropertyRecord {
    fn to_match(&self, similarity: f32) -> PropertyMatch {
        PropertyMatch {
            name: self.name.clone(),
            address: self.address.clone(),
            property_type: self.property_type.clone(),
            purchase_price: self.purchase_price,
            monthly_rent: self.monthly_rent,
            purchase_date: self.purchase_date.clone(),
            similarity,
        }
    }
}

/// An index over a fixed set of records.
#[derive(Debug, Default)]
pub struct InMemoryPropertyIndex {
    records: Vec<PropertyRecord>,
}

impl InMemoryPropertyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index over the given records.
    pub fn with_records(records: Vec<PropertyRecord>) -> Self {
        Self { records }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PropertyIndex for InMemoryPropertyIndex {
    fn name(&self) -> &str {
        "memory"
    }

    async fn search(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Result<Vec<PropertyMatch>, ProviderError> {
        let mut scored: Vec<(f32, &PropertyRecord)> = self
            .records
            .iter()
            .filter_map(|record| {
                let sim = cosine_similarity(&record.embedding, embedding);
                if sim >= threshold {
                    Some((sim, record))
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(sim, record)| record.to_match(sim))
            .collect())
    }
}
