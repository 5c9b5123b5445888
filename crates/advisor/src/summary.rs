//! Transaction summarization.
//!
//! Groups caller-supplied transactions by category, sums each group, and
//! renders one `{label}: {sum}円` line per category. Group order is the
//! first-appearance order of the input, so the output is deterministic for
//! a given input sequence.

use std::collections::HashMap;

use rentier_core::query::TransactionRecord;

/// Label for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "未分類";

/// Rendered when the caller supplied no transactions.
pub const NO_TRANSACTIONS_SENTINEL: &str = "取引データはありません。";

/// Summarize transactions into per-category total lines.
///
/// Whole-yen totals render without a decimal point (`150000円`, never
/// `150000.0円`); fractional totals keep their digits.
pub fn summarize_transactions(transactions: &[TransactionRecord]) -> String {
    if transactions.is_empty() {
        return NO_TRANSACTIONS_SENTINEL.to_string();
    }

    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for tx in transactions {
        let label = tx
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string());
        if !totals.contains_key(&label) {
            order.push(label.clone());
        }
        *totals.entry(label).or_insert(0.0) += tx.amount;
    }

    order
        .iter()
        .map(|label| format!("{}: {}円", label, totals[label]))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(category: Option<&str>, amount: f64) -> TransactionRecord {
        TransactionRecord {
            category: category.map(String::from),
            amount,
        }
    }

    /// Parse a rendered summary back into (label, total) pairs.
    fn parse(summary: &str) -> Vec<(String, f64)> {
        summary
            .lines()
            .map(|line| {
                let stripped = line.strip_suffix('円').unwrap();
                let (label, sum) = stripped.rsplit_once(": ").unwrap();
                (label.to_string(), sum.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn empty_input_renders_sentinel_exactly() {
        assert_eq!(summarize_transactions(&[]), NO_TRANSACTIONS_SENTINEL);
    }

    #[test]
    fn groups_and_sums_by_category() {
        let txs = vec![
            tx(Some("rent"), 100_000.0),
            tx(Some("rent"), 50_000.0),
            tx(Some("repair"), 20_000.0),
        ];
        let summary = summarize_transactions(&txs);

        assert!(summary.contains("rent: 150000"));
        assert!(summary.contains("repair: 20000"));

        // Deterministic first-appearance order: rent line before repair.
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rent:"));
        assert!(lines[1].starts_with("repair:"));
    }

    #[test]
    fn conserves_total_amount() {
        let txs = vec![
            tx(Some("家賃収入"), 120_000.0),
            tx(Some("修繕費"), -35_000.0),
            tx(None, 8_000.0),
            tx(Some("家賃収入"), 120_000.0),
            tx(Some("管理費"), -5_500.5),
        ];
        let input_total: f64 = txs.iter().map(|t| t.amount).sum();

        let summary = summarize_transactions(&txs);
        let rendered_total: f64 = parse(&summary).iter().map(|(_, sum)| sum).sum();

        assert!((input_total - rendered_total).abs() < 1e-6);
    }

    #[test]
    fn none_category_uses_uncategorized_label() {
        let summary = summarize_transactions(&[tx(None, 3_000.0)]);
        assert_eq!(summary, format!("{UNCATEGORIZED_LABEL}: 3000円"));
    }

    #[test]
    fn first_appearance_order_survives_interleaving() {
        let txs = vec![
            tx(Some("b"), 1.0),
            tx(Some("a"), 2.0),
            tx(Some("b"), 3.0),
            tx(Some("c"), 4.0),
            tx(Some("a"), 5.0),
        ];
        let labels: Vec<String> = parse(&summarize_transactions(&txs))
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn whole_yen_totals_have_no_decimal_point() {
        let summary = summarize_transactions(&[tx(Some("rent"), 150_000.0)]);
        assert_eq!(summary, "rent: 150000円");
    }

    #[test]
    fn fractional_totals_keep_digits() {
        let summary = summarize_transactions(&[tx(Some("utility"), 1_234.5)]);
        assert_eq!(summary, "utility: 1234.5円");
    }
}
