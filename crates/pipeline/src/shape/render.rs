//! Text transforms for each output format.

use std::sync::LazyLock;

use regex::Regex;

use super::{OutFormat, ResponseMode};

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:[-*•]\s*|\d+[.)]\s*|step\s*\d+\s*:\s*)").unwrap());
static STEP_NUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^\s*\[?['"]?\s*\d+\.\s*"#).unwrap());
static STEP_BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*]\s+").unwrap());
static STEP_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:step\s*\d+[:.)-]\s*|\d+[:.)-]\s*)").unwrap());
static SYS_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*\[?\s*sys\s*\]?\s*").unwrap());
static CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:;|\s+then\s+|\s+and\s+)").unwrap());

/// Lead-in lines a model prepends that carry no content.
const BOILERPLATE: &[&str] = &["to explain", "we can", "here are", "the following", "in this"];

/// Shape `text` according to `mode`.
pub fn render(text: &str, mode: &ResponseMode) -> String {
    match mode.format {
        OutFormat::Bullets => render_bullets(text, mode.bullet_count),
        OutFormat::Steps => render_steps(text, mode.sentence_cap),
        OutFormat::Code => render_code(text),
        OutFormat::Plain | OutFormat::Mixed => render_plain(text, mode),
    }
}

/// Split on sentence terminators followed by whitespace, keeping the
/// terminator with its sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_none_or(|n| n.is_whitespace()) {
            let piece = current.trim();
            if !piece.is_empty() {
                out.push(piece.to_string());
            }
            current.clear();
        }
    }
    let piece = current.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
    out
}

fn is_boilerplate(line: &str) -> bool {
    let low = line.to_lowercase();
    BOILERPLATE.iter().any(|b| low.starts_with(b))
}

fn render_bullets(text: &str, bullet_count: Option<usize>) -> String {
    let mut lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| MARKER_RE.replace(l, "").trim().to_string())
        .filter(|l| !l.is_empty() && !is_boilerplate(l))
        .collect();

    if let Some(count) = bullet_count
        && count > 0
    {
        lines.truncate(count);
    }

    lines.iter().map(|l| format!("- {}", l)).collect::<Vec<_>>().join("\n")
}

/// Scrub numbering, markers, and role-tag artifacts off one step line.
fn clean_step_line(line: &str) -> String {
    let x = STEP_NUM_RE.replace(line.trim(), "");
    let x = STEP_BULLET_RE.replace(&x, "");
    let x = STEP_PREFIX_RE.replace(&x, "");
    let x = SYS_TAG_RE.replace(&x, "");
    x.trim_matches(['[', ']', '\'', '"', ' ']).trim_end_matches(['.', '!', '?']).trim().to_string()
}

fn render_steps(text: &str, sentence_cap: Option<usize>) -> String {
    let src = text.replace('\n', " ").trim().to_string();

    let mut pieces = split_sentences(&src);
    if pieces.len() < 3 {
        pieces = CLAUSE_RE.split(&src).map(String::from).collect();
    }

    let mut cleaned: Vec<String> = pieces
        .iter()
        .map(|p| clean_step_line(p))
        .filter(|p| !p.is_empty() && !is_boilerplate(p))
        .collect();

    let cap = sentence_cap.unwrap_or(5);
    if cap > 0 {
        cleaned.truncate(cap);
    }

    if cleaned.is_empty() && !src.is_empty() {
        cleaned.push(clean_step_line(&src));
    }

    cleaned.iter().enumerate().map(|(i, s)| format!("{}. {}", i + 1, s)).collect::<Vec<_>>().join("\n")
}

fn render_code(text: &str) -> String {
    if text.contains("```") {
        return text.to_string();
    }

    let fence = if ["def ", "import ", "print(", "lambda ", "class "].iter().any(|t| text.contains(t)) {
        "```python\n"
    } else if ["fn ", "let ", "impl ", "use "].iter().any(|t| text.contains(t)) {
        "```rust\n"
    } else {
        "```\n"
    };
    format!("{}{}\n```", fence, text.trim())
}

fn render_plain(text: &str, mode: &ResponseMode) -> String {
    let mut out = text.to_string();

    // Sentence cap applies only when explicitly requested and the text
    // carries no code fence.
    if let Some(cap) = mode.sentence_cap
        && cap > 0
        && !out.contains("```")
    {
        let sentences = split_sentences(&out);
        if !sentences.is_empty() {
            out = sentences.into_iter().take(cap).collect::<Vec<_>>().join(" ");
        }
    }

    // Word cap last.
    if let Some(max_words) = mode.max_words
        && max_words > 0
    {
        let words: Vec<&str> = out.split_whitespace().collect();
        if words.len() > max_words {
            out = format!("{}…", words[..max_words].join(" "));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Verbosity, decide_mode};

    fn mode(format: OutFormat) -> ResponseMode {
        ResponseMode { format, ..ResponseMode::default() }
    }

    #[test]
    fn test_steps_cap_exact() {
        let m = ResponseMode { format: OutFormat::Steps, sentence_cap: Some(3), ..ResponseMode::default() };
        let out = render("Do X. Do Y. Do Z. Do W. Do V. Do U.", &m);
        assert_eq!(out, "1. Do X\n2. Do Y\n3. Do Z");
    }

    #[test]
    fn test_steps_default_cap_five() {
        let out = render("A one. B two. C three. D four. E five. F six. G seven.", &mode(OutFormat::Steps));
        assert_eq!(out.lines().count(), 5);
        assert!(out.starts_with("1. A one"));
    }

    #[test]
    fn test_steps_clause_fallback() {
        let out = render("open the lid; add water then press start", &mode(OutFormat::Steps));
        assert_eq!(out, "1. open the lid\n2. add water\n3. press start");
    }

    #[test]
    fn test_steps_scrubs_artifacts() {
        let out = render("[SYS] first thing. Step 2: second thing. - third thing.", &mode(OutFormat::Steps));
        assert_eq!(out, "1. first thing\n2. second thing\n3. third thing");
    }

    #[test]
    fn test_bullets_exact_count_preserves_order() {
        let m = ResponseMode { format: OutFormat::Bullets, bullet_count: Some(3), ..ResponseMode::default() };
        let out = render("alpha\n* beta\n1. gamma\ndelta\nepsilon", &m);
        assert_eq!(out, "- alpha\n- beta\n- gamma");
    }

    #[test]
    fn test_bullets_strip_markers_and_boilerplate() {
        let out = render("Here are some points\n- one\n• two", &mode(OutFormat::Bullets));
        assert_eq!(out, "- one\n- two");
    }

    #[test]
    fn test_code_wraps_unfenced() {
        assert_eq!(render("print('hi')", &mode(OutFormat::Code)), "```python\nprint('hi')\n```");
        assert!(render("fn main() {}", &mode(OutFormat::Code)).starts_with("```rust\n"));
        assert!(render("SELECT 1", &mode(OutFormat::Code)).starts_with("```\n"));
    }

    #[test]
    fn test_code_already_fenced_untouched() {
        let fenced = "```js\nlet x = 1;\n```";
        assert_eq!(render(fenced, &mode(OutFormat::Code)), fenced);
    }

    #[test]
    fn test_plain_sentence_cap() {
        let m = ResponseMode { format: OutFormat::Plain, sentence_cap: Some(2), ..ResponseMode::default() };
        assert_eq!(render("One. Two. Three. Four.", &m), "One. Two.");
    }

    #[test]
    fn test_plain_sentence_cap_skips_fenced() {
        let m = ResponseMode { format: OutFormat::Plain, sentence_cap: Some(1), ..ResponseMode::default() };
        let fenced = "Intro. ```\ncode\n``` Outro.";
        assert_eq!(render(fenced, &m), fenced);
    }

    #[test]
    fn test_word_cap_with_ellipsis() {
        let m = ResponseMode { format: OutFormat::Plain, max_words: Some(3), ..ResponseMode::default() };
        assert_eq!(render("one two three four five", &m), "one two three…");
    }

    #[test]
    fn test_tldr_end_to_end() {
        let m = decide_mode("tl;dr the meeting notes");
        assert_eq!(m.verbosity, Verbosity::Brief);
        let long = "word ".repeat(60);
        assert!(render(&long, &m).ends_with('…'));
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(split_sentences("A b. C d! E?"), vec!["A b.", "C d!", "E?"]);
        assert_eq!(split_sentences("v1.2 is out. Yes."), vec!["v1.2 is out.", "Yes."]);
    }
}
