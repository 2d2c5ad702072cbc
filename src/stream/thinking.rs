use std::sync::LazyLock;

use regex_lite::Regex;

use crate::config::ThinkTagsMode;

static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary>.*?</summary>").expect("literal regex"));
static DETAILS_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<details[^>]*>").expect("literal regex"));

/// Normalize thinking-phase markup before surfacing it to the caller.
///
/// The upstream wraps deliberation in frontend chrome: a `<summary>` block,
/// `<details>` wrappers, and `> ` quote prefixes on every line. Processing
/// order matters: summaries go first so their content never survives into
/// the tag rewrite, and quote prefixes are stripped last.
#[must_use]
pub fn normalize(raw: &str, mode: ThinkTagsMode) -> String {
    let text = SUMMARY_RE.replace_all(raw, "");
    let text = text
        .replace("</thinking>", "")
        .replace("<Full>", "")
        .replace("</Full>", "");
    let text = text.trim();

    let text = match mode {
        ThinkTagsMode::Think => DETAILS_OPEN_RE
            .replace_all(text, "<span>")
            .replace("</details>", "</span>"),
        ThinkTagsMode::Strip => DETAILS_OPEN_RE
            .replace_all(text, "")
            .replace("</details>", ""),
        ThinkTagsMode::Raw => text.to_string(),
    };

    let text = text.strip_prefix("> ").unwrap_or(&text);
    let text = text.replace("\n> ", "\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mode_removes_summary_and_quotes() {
        let raw = "<summary>skip</summary>> hello\n> world";
        assert_eq!(normalize(raw, ThinkTagsMode::Strip), "hello\nworld");
    }

    #[test]
    fn test_think_mode_rewrites_details() {
        let raw = "<details type=\"reasoning\" open>inner</details>";
        assert_eq!(normalize(raw, ThinkTagsMode::Think), "<span>inner</span>");
    }

    #[test]
    fn test_strip_mode_removes_details() {
        let raw = "<details open>inner</details>";
        assert_eq!(normalize(raw, ThinkTagsMode::Strip), "inner");
    }

    #[test]
    fn test_raw_mode_keeps_details() {
        let raw = "<details>inner</details>";
        assert_eq!(normalize(raw, ThinkTagsMode::Raw), "<details>inner</details>");
    }

    #[test]
    fn test_summary_stripped_in_raw_mode() {
        // Summary chrome goes regardless of mode; only <details> handling varies.
        let raw = "<summary>Thought for 3s</summary>body";
        assert_eq!(normalize(raw, ThinkTagsMode::Raw), "body");
    }

    #[test]
    fn test_stray_closers_removed() {
        let raw = "a</thinking>b<Full>c</Full>d";
        assert_eq!(normalize(raw, ThinkTagsMode::Strip), "abcd");
    }

    #[test]
    fn test_quote_prefixes_removed_per_line() {
        let raw = "> first\n> second\nthird";
        assert_eq!(
            normalize(raw, ThinkTagsMode::Strip),
            "first\nsecond\nthird"
        );
    }

    #[test]
    fn test_quote_marker_inside_line_preserved() {
        let raw = "value > threshold";
        assert_eq!(normalize(raw, ThinkTagsMode::Strip), "value > threshold");
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let once = normalize("plain thinking text", ThinkTagsMode::Think);
        let twice = normalize(&once, ThinkTagsMode::Think);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_multiline_summary() {
        let raw = "<summary>line1\nline2</summary>kept";
        assert_eq!(normalize(raw, ThinkTagsMode::Strip), "kept");
    }
}
