//! HTML-to-text cleaning.
//!
//! A deliberately light cleaner for web extracts:
//!
//! - Decode the byte body as lossy UTF-8
//! - Turn `<h1>`..`<h3>` boundaries into line breaks so sectioning survives
//! - Drop `<script>`, `<style>`, and `<noscript>` blocks entirely
//! - Strip every remaining tag
//! - Unescape basic entities, after stripping, so encoded angle brackets
//!   in text are never mistaken for markup
//! - Collapse whitespace and bound the output length
//!
//! This is extract material for synthesis, not article rendering; keeping
//! it regex-based keeps the behavior predictable on broken markup.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum characters kept from a single cleaned document.
pub const MAX_CLEAN_CHARS: usize = 400_000;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)</?h[1-3][^>]*>").unwrap());
static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
static NOSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<noscript.*?</noscript>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\x0b\x0c]+").unwrap());
static SPACE_NL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +\n").unwrap());

/// Clean a fetched byte body into bounded plain text.
///
/// Returns an empty string for empty input or markup that cleans to
/// nothing; callers drop such documents.
pub fn clean_html(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }
    let s = String::from_utf8_lossy(body);

    let s = HEADING_RE.replace_all(&s, "\n");
    let s = SCRIPT_RE.replace_all(&s, " ");
    let s = STYLE_RE.replace_all(&s, " ");
    let s = NOSCRIPT_RE.replace_all(&s, " ");
    let s = TAG_RE.replace_all(&s, " ");

    let s = unescape_entities(&s);
    let s = SPACE_RE.replace_all(&s, " ");
    let s = SPACE_NL_RE.replace_all(&s, "\n");
    let s = s.trim();

    s.chars().take(MAX_CLEAN_CHARS).collect()
}

/// First non-empty line of a cleaned extract, bounded, for use as a title.
pub fn first_line_title(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .chars()
        .take(120)
        .collect()
}

/// Decode the handful of entities that matter for extract text. `&amp;`
/// goes last so double-encoded text decodes only one level.
fn unescape_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = b"<html><head><style>body{color:red}</style></head>\
                     <body><script>alert(1)</script><p>Hello world</p></body></html>";
        let text = clean_html(html);
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_headings_become_line_breaks() {
        let html = b"<h1>Title</h1><p>Body text</p><h2>Section</h2><p>More</p>";
        let text = clean_html(html);
        assert!(text.contains("Title"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_entities_decoded() {
        let text = clean_html(b"<p>a &amp; b &lt;c&gt;</p>");
        assert_eq!(text, "a & b <c>");
    }

    #[test]
    fn test_encoded_markup_survives_stripping() {
        // Entity-encoded code samples are text, not tags to delete.
        let text = clean_html(b"<pre>&lt;div class=&quot;x&quot;&gt;</pre>");
        assert_eq!(text, "<div class=\"x\">");
    }

    #[test]
    fn test_double_encoded_decodes_one_level() {
        assert_eq!(clean_html(b"<p>&amp;lt;c&amp;gt;</p>"), "&lt;c&gt;");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let text = clean_html(b"<p>a    b\t\tc</p>");
        assert_eq!(text, "a b c");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_html(b""), "");
        assert_eq!(clean_html(b"<script>only noise</script>"), "");
    }

    #[test]
    fn test_first_line_title() {
        assert_eq!(first_line_title("\n  Release Notes\nbody"), "Release Notes");
        assert_eq!(first_line_title(""), "");
    }

    #[test]
    fn test_title_is_bounded() {
        let long = "x".repeat(500);
        assert_eq!(first_line_title(&long).len(), 120);
    }
}
