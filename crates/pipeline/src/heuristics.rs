//! Named intent predicates.
//!
//! Each heuristic the pipeline routes on lives here as an independently
//! testable function: the recency classifier behind the web stage, the
//! greeting matcher, version-token extraction for the version guard, and
//! the conservative query refinement used by the single web retry.

use std::sync::LazyLock;

use regex::Regex;

/// Strong recency cues, word-bounded.
static RECENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:",
        r"latest|today|tonight|now|breaking|this\s+(?:week|month)",
        r"|release\s*notes?|changelog|driver|patch|update",
        r"|cve-\d{4}-\d+|vuln(?:erability)?|security",
        r"|price|earnings|stock",
        r"|outage|status|schedule",
        r"|forecast|weather",
        r"|ranking|standings|score|results?",
        r")\b",
    ))
    .unwrap()
});

/// Near-term year cues (2020 through 2039).
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b20(?:2\d|3\d)\b").unwrap());

static GREETING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:hi|hello|hey|yo|hiya|sup|howdy)[!. ]*$").unwrap());

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+\.\d+)\b").unwrap());

/// True when a query clearly needs fresh online data.
///
/// Short explanation-intent asks ("explain X", "what is Y") stay offline
/// even when they also carry a recency keyword; past that exemption, any
/// recency keyword or near-term year qualifies.
pub fn wants_web(query: &str) -> bool {
    let ql = query.trim().to_lowercase();
    if ql.is_empty() {
        return false;
    }

    let words: Vec<&str> = ql.split_whitespace().collect();
    if words.len() <= 6
        && matches!(words[0], "explain" | "what" | "how" | "code" | "example" | "show")
    {
        return false;
    }

    RECENCY_RE.is_match(&ql) || YEAR_RE.is_match(&ql)
}

/// True for a bare greeting token ("hi", "hello!", "hey.").
pub fn is_greeting(query: &str) -> bool {
    GREETING_RE.is_match(query.trim())
}

/// First decimal version token in the query ("cuda 12.6" -> "12.6").
pub fn version_token(query: &str) -> Option<&str> {
    VERSION_RE.captures(query).map(|c| c.get(1).map_or("", |m| m.as_str()))
}

/// One conservative refinement for the adaptive web retry: scope known
/// vendors to their own sites and nudge toward versioned pages. Returns
/// `None` when nothing useful can be added.
pub fn refine_query(query: &str) -> Option<String> {
    let mut refined = query.trim().to_string();
    let low = refined.to_lowercase();

    if low.contains("nvidia") && !low.contains("site:") {
        refined.push_str(" site:nvidia.com");
    } else if low.contains("release notes") && !low.contains("site:") {
        refined.push_str(" site:github.com OR site:docs.nvidia.com");
    }
    if (low.contains("release") || low.contains("notes")) && !low.contains("version") {
        refined.push_str(" version");
    }

    (refined != query.trim()).then_some(refined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_web_recency_keywords() {
        assert!(wants_web("latest nvidia linux driver"));
        assert!(wants_web("cuda 12.6 release notes"));
        assert!(wants_web("btc price"));
        assert!(wants_web("driver for my gpu is broken and needs an update"));
        assert!(wants_web("weather in oslo tomorrow maybe"));
    }

    #[test]
    fn test_wants_web_years() {
        assert!(wants_web("rust conferences happening around town in 2026"));
        assert!(!wants_web("the treaty of 1919 explained in depth please and thanks"));
    }

    #[test]
    fn test_wants_web_explanation_exemption() {
        assert!(!wants_web("explain the latest gc algorithm"));
        assert!(!wants_web("what is a release branch"));
        assert!(!wants_web("how do drivers work"));
        assert!(!wants_web("show example code"));
    }

    #[test]
    fn test_wants_web_exemption_only_when_short() {
        // Seven words, so the exemption no longer applies.
        assert!(wants_web("explain the latest nvidia driver release notes please"));
    }

    #[test]
    fn test_wants_web_default_offline() {
        assert!(!wants_web("write a haiku about rivers"));
        assert!(!wants_web(""));
    }

    #[test]
    fn test_is_greeting() {
        assert!(is_greeting("hi"));
        assert!(is_greeting("Hello!"));
        assert!(is_greeting("hey. "));
        assert!(!is_greeting("hi there"));
        assert!(!is_greeting("high noon"));
    }

    #[test]
    fn test_version_token() {
        assert_eq!(version_token("cuda 12.6 release notes"), Some("12.6"));
        assert_eq!(version_token("python 3.13"), Some("3.13"));
        assert_eq!(version_token("no versions here"), None);
    }

    #[test]
    fn test_refine_query_nvidia() {
        let refined = refine_query("latest nvidia driver release").unwrap();
        assert!(refined.contains("site:nvidia.com"));
        assert!(refined.ends_with(" version"));
    }

    #[test]
    fn test_refine_query_release_notes() {
        let refined = refine_query("foolib release notes").unwrap();
        assert!(refined.contains("site:github.com"));
    }

    #[test]
    fn test_refine_query_noop() {
        assert!(refine_query("weather in oslo").is_none());
        assert!(refine_query("nvidia driver site:nvidia.com version").is_none());
    }
}
