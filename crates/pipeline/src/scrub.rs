//! Final output scrub.
//!
//! Applied to every outgoing answer except the code-only fast path. The
//! scrub only rewrites when the no-emoji flag is set: emoji and joiner
//! codepoints are stripped, then runs of spaces and space around newlines
//! are collapsed.

use std::sync::LazyLock;

use regex::Regex;

static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[\u{1F1E6}-\u{1F1FF}]",  // regional indicators (flags)
        r"|[\u{1F300}-\u{1F5FF}]", // symbols & pictographs
        r"|[\u{1F600}-\u{1F64F}]", // emoticons
        r"|[\u{1F680}-\u{1F6FF}]", // transport & map
        r"|[\u{1F700}-\u{1F77F}]",
        r"|[\u{1F780}-\u{1F7FF}]",
        r"|[\u{1F800}-\u{1F8FF}]",
        r"|[\u{1F900}-\u{1F9FF}]",
        r"|[\u{1FA00}-\u{1FA6F}]",
        r"|[\u{1FA70}-\u{1FAFF}]",
        r"|[\u{FE00}-\u{FE0F}]", // variation selectors
        r"|\u{200D}",            // zero-width joiner
    ))
    .unwrap()
});

static RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_PAD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n *").unwrap());

/// Scrub outgoing text. A no-op unless `no_emoji` is set; a scrub that
/// empties the text yields the literal "[empty]" marker.
pub fn final_scrub(text: &str, no_emoji: bool) -> String {
    if text.is_empty() || !no_emoji {
        return text.to_string();
    }

    let out = EMOJI_RE.replace_all(text, "");
    let out = RUN_RE.replace_all(&out, " ");
    let out = NEWLINE_PAD_RE.replace_all(&out, "\n");
    let out = out.trim();

    if out.is_empty() { "[empty]".to_string() } else { out.to_string() }
}
