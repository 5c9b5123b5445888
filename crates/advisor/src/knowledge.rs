//! Static knowledge base.
//!
//! Two fixed sets of snippets — general FAQ and market/news/legal — loaded
//! once at process start and shared read-only across requests. The builtin
//! sets are always present; a TOML file named in `[knowledge] file` can
//! append extra entries at startup. Nothing mutates a `KnowledgeBase` after
//! construction.

use std::path::Path;

use serde::Deserialize;

use rentier_config::{AppConfig, ConfigError};

/// Read-only knowledge snippets injected into every assembled context.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    faq: Vec<String>,
    market: Vec<String>,
}

/// Extra entries loaded from the optional knowledge file.
#[derive(Debug, Deserialize, Default)]
struct KnowledgeFile {
    #[serde(default)]
    faq: Vec<String>,
    #[serde(default)]
    market: Vec<String>,
}

impl KnowledgeBase {
    /// The builtin FAQ and market sets. Always present.
    pub fn builtin() -> Self {
        Self {
            faq: vec![
                "利回りとは、投資金額に対する年間収益の割合です。表面利回りは年間家賃収入÷物件価格、実質利回りは諸経費を差し引いた年間収益÷物件価格で計算します。".to_string(),
                "キャッシュフローとは、家賃収入から運営経費とローン返済額を差し引いた手残り額のことです。".to_string(),
                "減価償却とは、建物の取得費用を法定耐用年数にわたって経費として配分する会計処理です。土地は減価償却の対象外です。".to_string(),
                "固定資産税は毎年1月1日時点の不動産所有者に課税され、課税標準額×1.4%が標準税率です。".to_string(),
                "不動産所得は総収入金額から必要経費を差し引いて計算し、給与所得などと損益通算できます。".to_string(),
            ],
            market: vec![
                "2024年4月から相続登記の申請が義務化され、取得を知った日から3年以内の登記が必要です。".to_string(),
                "日銀の金融政策正常化に伴い、変動型住宅ローン金利は緩やかな上昇傾向にあります。".to_string(),
                "都市部の単身者向け賃貸需要は堅調で、駅近ワンルームの空室率は低水準で推移しています。".to_string(),
                "賃貸借契約における原状回復費用の負担区分は、国土交通省のガイドラインが実務上の基準です。".to_string(),
            ],
        }
    }

    /// Builtin sets plus any entries from the configured knowledge file.
    pub fn load(config: &AppConfig) -> Result<Self, ConfigError> {
        let mut base = Self::builtin();
        if let Some(path) = &config.knowledge.file {
            base.extend_from_file(Path::new(path))?;
        }
        Ok(base)
    }

    /// Append entries from a TOML file with optional `faq` / `market` arrays.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let extra: KnowledgeFile =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            path = %path.display(),
            faq = extra.faq.len(),
            market = extra.market.len(),
            "Extending knowledge base from file"
        );

        self.faq.extend(extra.faq);
        self.market.extend(extra.market);
        Ok(())
    }

    /// Build from explicit sets. Used by tests that need controlled content.
    pub fn with_entries(faq: Vec<String>, market: Vec<String>) -> Self {
        Self { faq, market }
    }

    /// Render both sets as one entry per line, FAQ first.
    ///
    /// The output is identical across requests for a given knowledge base.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.faq.len() + self.market.len());
        lines.extend(self.faq.iter().map(String::as_str));
        lines.extend(self.market.iter().map(String::as_str));
        lines.join("\n")
    }

    pub fn faq_len(&self) -> usize {
        self.faq.len()
    }

    pub fn market_len(&self) -> usize {
        self.market.len()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_explains_yield() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.render().contains("利回り"));
    }

    #[test]
    fn render_is_one_entry_per_line() {
        let kb = KnowledgeBase::with_entries(
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        );
        assert_eq!(kb.render(), "a\nb\nc");
    }

    #[test]
    fn render_is_stable_across_calls() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.render(), kb.render());
    }

    #[test]
    fn extend_appends_after_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        std::fs::write(
            &path,
            r#"
faq = ["サブリース契約では賃料改定条項に注意が必要です。"]
market = ["金利上昇局面では固定型ローンへの借り換え相談が増えています。"]
"#,
        )
        .unwrap();

        let mut kb = KnowledgeBase::builtin();
        let before_faq = kb.faq_len();
        kb.extend_from_file(&path).unwrap();

        assert_eq!(kb.faq_len(), before_faq + 1);
        assert!(kb.render().contains("サブリース"));
        assert!(kb.render().contains("利回り"));
    }

    #[test]
    fn extend_missing_file_is_read_error() {
        let mut kb = KnowledgeBase::builtin();
        let err = kb
            .extend_from_file(Path::new("/nonexistent/knowledge.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn extend_bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "faq = not-an-array").unwrap();

        let mut kb = KnowledgeBase::builtin();
        let err = kb.extend_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
