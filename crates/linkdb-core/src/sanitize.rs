//! Markup escaping for link text
//!
//! Links are escaped once at load time so every renderer can emit them
//! as-is. Escaping is idempotent: an `&` that already starts one of the
//! entities produced here is left alone, so text that went through a
//! previous load is not double-escaped.

use crate::models::Link;

/// Entities `escape_html` produces, without the leading `&`
const KNOWN_ENTITIES: &[&str] = &["amp;", "lt;", "gt;", "quot;", "#039;", "#39;"];

/// HTML-escape `&`, `<`, `>`, `"` and `'`
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for (i, c) in text.char_indices() {
        match c {
            '&' if KNOWN_ENTITIES
                .iter()
                .any(|entity| text[i + 1..].starts_with(entity)) =>
            {
                escaped.push('&')
            }
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Escape every free-text field of a link in place
pub fn sanitize_link(link: &mut Link) {
    link.title = escape_html(&link.title);
    link.description = escape_html(&link.description);
    link.url = escape_html(&link.url);
    link.tags = escape_html(&link.tags);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x" + 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; + &#039;y&#039;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_escapes_bare_ampersand() {
        assert_eq!(escape_html("fish & chips"), "fish &amp; chips");
        assert_eq!(escape_html("?a=1&b=2"), "?a=1&amp;b=2");
        assert_eq!(escape_html("&copy;"), "&amp;copy;");
    }

    #[test]
    fn test_is_idempotent() {
        let once = escape_html(r#"<a href="/?a=1&b=2">Tom's</a>"#);
        assert_eq!(escape_html(&once), once);
    }

    #[test]
    fn test_leaves_plain_text_alone() {
        assert_eq!(escape_html("plain text, ünïcödé"), "plain text, ünïcödé");
    }

    #[test]
    fn test_sanitize_link() {
        let mut link = Link::with_linkdate("20110914_192317", "https://x.org/?a=1&b=2");
        link.set_title("<b>bold</b>");
        link.set_description("it's");
        link.set_tags("c++ <tag>");

        sanitize_link(&mut link);

        assert_eq!(link.url, "https://x.org/?a=1&amp;b=2");
        assert_eq!(link.title, "&lt;b&gt;bold&lt;/b&gt;");
        assert_eq!(link.description, "it&#039;s");
        assert_eq!(link.tags, "c++ &lt;tag&gt;");
        assert_eq!(link.linkdate, "20110914_192317");
    }
}
