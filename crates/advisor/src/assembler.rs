//! Context assembly.
//!
//! Builds the textual context blob for one request from three sections in
//! fixed order:
//!
//! 1. **Property matches** — formatted similarity hits, most specific
//! 2. **Transaction summary** — the caller's own data
//! 3. **Static knowledge** — FAQ and market snippets, least specific
//!
//! Sections are joined by [`SECTION_SEPARATOR`]. The assembler is a pure
//! function of its inputs plus the injected read-only [`KnowledgeBase`]:
//! identical inputs always produce an identical blob, and nothing is cached
//! across requests.

use std::sync::Arc;

use rentier_core::property::PropertyMatch;
use rentier_core::query::TransactionRecord;

use crate::knowledge::KnowledgeBase;
use crate::summary::summarize_transactions;

/// Fixed separator between the three context sections.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Rendered when the store returned zero hits.
pub const NO_MATCH_SENTINEL: &str = "関連する物件情報は見つかりませんでした。";

/// Placeholder for missing price or rent fields.
pub const UNKNOWN_FIELD: &str = "不明";

/// Assembles per-request context blobs over a shared knowledge base.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    knowledge: Arc<KnowledgeBase>,
}

impl ContextAssembler {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Build the three-section context blob.
    ///
    /// Hit order is preserved exactly as the store returned it; the
    /// assembler never re-ranks.
    pub fn assemble(
        &self,
        question: &str,
        transactions: &[TransactionRecord],
        matches: &[PropertyMatch],
    ) -> String {
        tracing::debug!(
            question_len = question.len(),
            matches = matches.len(),
            transactions = transactions.len(),
            "Assembling context"
        );

        let sections = [
            format_matches(matches),
            summarize_transactions(transactions),
            self.knowledge.render(),
        ];
        sections.join(SECTION_SEPARATOR)
    }
}

/// Render hits as labeled multi-line blocks, or the no-match sentinel.
fn format_matches(matches: &[PropertyMatch]) -> String {
    if matches.is_empty() {
        return NO_MATCH_SENTINEL.to_string();
    }

    matches
        .iter()
        .map(format_match)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_match(hit: &PropertyMatch) -> String {
    format!(
        "物件名: {}\n住所: {}\n種別: {}\n購入価格: {}\n月額賃料: {}\n購入日: {}\n類似度: {:.2}",
        hit.name,
        hit.address,
        hit.property_type,
        format_yen(hit.purchase_price),
        format_yen(hit.monthly_rent),
        hit.purchase_date,
        hit.similarity,
    )
}

fn format_yen(amount: Option<f64>) -> String {
    match amount {
        Some(value) => format!("{value}円"),
        None => UNKNOWN_FIELD.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> ContextAssembler {
        ContextAssembler::new(Arc::new(KnowledgeBase::builtin()))
    }

    fn hit(name: &str, similarity: f32) -> PropertyMatch {
        PropertyMatch {
            name: name.to_string(),
            address: "東京都新宿区西新宿1-1-1".to_string(),
            property_type: "マンション".to_string(),
            purchase_price: Some(25_000_000.0),
            monthly_rent: Some(98_000.0),
            purchase_date: "2021-06-15".to_string(),
            similarity,
        }
    }

    #[test]
    fn blob_has_exactly_three_sections_in_fixed_order() {
        let blob = assembler().assemble(
            "この物件は？",
            &[TransactionRecord {
                category: Some("rent".to_string()),
                amount: 100_000.0,
            }],
            &[hit("物件A", 0.9)],
        );

        let sections: Vec<&str> = blob.split(SECTION_SEPARATOR).collect();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].contains("物件名: 物件A"));
        assert!(sections[1].contains("rent: 100000円"));
        assert!(sections[2].contains("利回り"));
    }

    #[test]
    fn zero_hits_renders_sentinel_exactly() {
        let blob = assembler().assemble("q", &[], &[]);
        let sections: Vec<&str> = blob.split(SECTION_SEPARATOR).collect();
        assert_eq!(sections[0], NO_MATCH_SENTINEL);
    }

    #[test]
    fn missing_price_and_rent_render_unknown() {
        let mut h = hit("物件B", 0.8);
        h.purchase_price = None;
        h.monthly_rent = None;

        let blob = assembler().assemble("q", &[], &[h]);
        assert!(blob.contains("購入価格: 不明"));
        assert!(blob.contains("月額賃料: 不明"));
    }

    #[test]
    fn similarity_rounds_to_two_decimals() {
        let blob = assembler().assemble("q", &[], &[hit("物件C", 0.9)]);
        assert!(blob.contains("類似度: 0.90"));
    }

    #[test]
    fn hit_order_is_preserved_not_resorted() {
        // Lower similarity deliberately listed first; the assembler must
        // not reorder what the store returned.
        let blob = assembler().assemble("q", &[], &[hit("低い", 0.71), hit("高い", 0.95)]);
        let first = blob.find("低い").unwrap();
        let second = blob.find("高い").unwrap();
        assert!(first < second);
    }

    #[test]
    fn yield_question_with_no_data_contains_both_sentinels_and_faq() {
        let blob = assembler().assemble("利回りとは？", &[], &[]);
        assert!(blob.contains(NO_MATCH_SENTINEL));
        assert!(blob.contains(crate::summary::NO_TRANSACTIONS_SENTINEL));
        assert!(blob.contains("利回りとは"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let a = assembler();
        let txs = vec![TransactionRecord {
            category: None,
            amount: 42.0,
        }];
        let hits = vec![hit("物件D", 0.77)];
        assert_eq!(a.assemble("q", &txs, &hits), a.assemble("q", &txs, &hits));
    }
}
