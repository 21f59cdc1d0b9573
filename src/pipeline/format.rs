//! Output formatting.

use std::sync::LazyLock;

use regex::Regex;

/// Put adjacent script tags on separate lines.
///
/// Handles `</script><script…>` and `<script…><script…>`. Idempotent.
pub fn separate_scripts(html: &str) -> String {
    static RE_CLOSE_OPEN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(</script>)(<script[^>]*>)").unwrap());
    static RE_OPEN_OPEN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(<script[^>]*>)(<script[^>]*>)").unwrap());

    let html = RE_CLOSE_OPEN.replace_all(html, "${1}\n${2}");
    RE_OPEN_OPEN.replace_all(&html, "${1}\n${2}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separate_adjacent_scripts() {
        assert_eq!(
            separate_scripts(r#"<script src="a.js"></script><script src="b.js"></script>"#),
            "<script src=\"a.js\"></script>\n<script src=\"b.js\"></script>"
        );
    }

    #[test]
    fn test_separate_open_open() {
        assert_eq!(
            separate_scripts("<script><script defer>"),
            "<script>\n<script defer>"
        );
    }

    #[test]
    fn test_separate_scripts_idempotent() {
        let once = separate_scripts("<script></script><script></script><script></script>");
        assert_eq!(once, "<script></script>\n<script></script>\n<script></script>");
        assert_eq!(separate_scripts(&once), once);
    }

    #[test]
    fn test_separate_scripts_leaves_other_markup() {
        let html = "<p></p><script></script>\n<div></div>";
        assert_eq!(separate_scripts(html), html);
    }
}
