//! Prompt rendering.
//!
//! One fixed template with two placeholders: the assembled context and the
//! caller's question. The template carries the answer rules — Japanese
//! only, cite the context section used, refuse with a fixed phrase when the
//! context is insufficient, never speculate beyond the provided
//! information. These are prompt-text instructions; nothing here enforces
//! them at runtime.

/// Emitted by the model (per the template rules) when the context cannot
/// answer the question.
pub const REFUSAL_PHRASE: &str = "提供された情報からはお答えできません。";

/// Render the completion prompt for one request.
pub fn render(context: &str, question: &str) -> String {
    format!(
        "あなたは不動産投資の収支管理を支援するアドバイザーです。\n\
         以下のコンテキストは「---」で区切られた3つのセクション（関連物件情報・収支サマリー・基礎知識）で構成されています。\n\
         \n\
         コンテキスト:\n\
         {context}\n\
         \n\
         質問:\n\
         {question}\n\
         \n\
         回答のルール:\n\
         1. 必ず日本語のみで回答すること。\n\
         2. どのセクション（関連物件情報・収支サマリー・基礎知識）に基づく回答かを明記すること。\n\
         3. コンテキストに十分な情報がない場合は、推測せず「{REFUSAL_PHRASE}」とだけ回答すること。\n\
         4. 提供された情報の範囲内でのみ回答し、独自の意見や一般論を加えないこと。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_literal_question_and_context() {
        let prompt = render("取引データはありません。", "利回りとは？");
        assert!(prompt.contains("利回りとは？"));
        assert!(prompt.contains("取引データはありません。"));
    }

    #[test]
    fn carries_refusal_phrase() {
        let prompt = render("ctx", "q");
        assert!(prompt.contains(REFUSAL_PHRASE));
    }

    #[test]
    fn carries_answer_rules() {
        let prompt = render("ctx", "q");
        assert!(prompt.contains("日本語のみ"));
        assert!(prompt.contains("基礎知識"));
        assert!(prompt.contains("推測せず"));
    }

    #[test]
    fn template_is_fixed() {
        assert_eq!(render("a", "b"), render("a", "b"));
    }
}
