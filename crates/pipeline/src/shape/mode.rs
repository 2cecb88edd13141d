//! Format inference from query surface cues.
//!
//! Priority order: explicit "code only" beats an explicit bullet count,
//! which beats an explicit sentence count, then the steps cue, the
//! bullets cue, "tl;dr", and finally plain.

use std::sync::LazyLock;

use regex::Regex;

use super::{OutFormat, ResponseMode, Verbosity};

pub(crate) static BULLET_N_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:in|with)?\s*(\d+)\s*bullets?\b").unwrap());
pub(crate) static SENT_N_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*sentences?\b").unwrap());
pub(crate) static STEPS_N_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*steps?\b").unwrap());
static TLDR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btl;?dr\b").unwrap());

/// Word cap applied to a "tl;dr" ask.
const TLDR_WORD_CAP: usize = 40;

/// Infer the response mode for a query. Stored defaults are merged
/// separately so this function stays a pure read of the query text.
pub fn decide_mode(query: &str) -> ResponseMode {
    let q = query.trim();
    let ql = q.to_lowercase();

    let mut format = OutFormat::Plain;
    let mut verbosity = Verbosity::Normal;
    let mut max_words = None;

    // "in N steps" is remembered and applied below unless an explicit
    // bullet or sentence target overrides it.
    let steps_n = STEPS_N_RE.captures(&ql).and_then(|c| c[1].parse::<usize>().ok());

    if ql.contains("code only") || ql.starts_with("code-only:") {
        format = OutFormat::Code;
    } else if ql.contains(" in steps") || ql.starts_with("steps:") {
        format = OutFormat::Steps;
    } else if ql.contains(" in bullets") || ql.starts_with("bullets:") {
        format = OutFormat::Bullets;
    } else if TLDR_RE.is_match(&ql) {
        verbosity = Verbosity::Brief;
        format = OutFormat::Plain;
        max_words = Some(TLDR_WORD_CAP);
    }

    let mut bullet_count = None;
    let mut sentence_cap = None;

    if format != OutFormat::Code {
        // An explicit bullet count outranks an explicit sentence count.
        if let Some(caps) = BULLET_N_RE.captures(&ql) {
            format = OutFormat::Bullets;
            bullet_count = caps[1].parse().ok();
        } else if let Some(caps) = SENT_N_RE.captures(&ql) {
            format = OutFormat::Plain;
            sentence_cap = caps[1].parse().ok();
        }
        if bullet_count.is_none()
            && sentence_cap.is_none()
            && let Some(n) = steps_n
        {
            format = OutFormat::Steps;
            sentence_cap = Some(n);
        }
    }

    ResponseMode { verbosity, format, max_words, bullet_count, sentence_cap }
}
