//! Anti-hallucination guards over fetched extracts.
//!
//! Both guards run before any synthesis call so a generative model never
//! sees extracts the query plainly does not match.

use std::sync::LazyLock;

use regex::Regex;

use crate::heuristics::version_token;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Weak-match guard: at least one significant query keyword (length > 3,
/// capped at 6 keywords) must appear in at least one extract. A query with
/// no significant keywords passes vacuously.
pub fn weak_match(query: &str, extracts: &[String]) -> bool {
    let ql = query.to_lowercase();
    let keywords: Vec<&str> = WORD_RE.find_iter(&ql).map(|m| m.as_str()).filter(|w| w.len() > 3).take(6).collect();
    if keywords.is_empty() {
        return true;
    }

    extracts.iter().any(|text| {
        let tl = text.to_lowercase();
        keywords.iter().any(|k| tl.contains(k))
    })
}

/// Version guard: when the query names a decimal version ("12.6"), that
/// literal token must appear somewhere in the combined extracts.
pub fn version_present(query: &str, extracts: &[String]) -> bool {
    match version_token(query) {
        Some(version) => extracts.iter().any(|text| text.contains(version)),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_weak_match_hit() {
        let docs = extracts(&["The NVIDIA driver changelog mentions fixes"]);
        assert!(weak_match("latest nvidia linux driver", &docs));
    }

    #[test]
    fn test_weak_match_miss() {
        let docs = extracts(&["A page about gardening tips", "Another about sourdough"]);
        assert!(!weak_match("latest nvidia linux driver", &docs));
    }

    #[test]
    fn test_weak_match_short_words_ignored() {
        // Every query word is <= 3 chars, so the guard passes vacuously.
        assert!(weak_match("a to b", &extracts(&["anything"])));
    }

    #[test]
    fn test_weak_match_caps_keywords() {
        // Only the first six significant keywords count.
        let query = "alpha bravo charlie deltaa echoo foxtrot seventh";
        let docs = extracts(&["only seventh appears here"]);
        assert!(!weak_match(query, &docs));
    }

    #[test]
    fn test_version_guard() {
        let with = extracts(&["CUDA Toolkit 12.6 introduces"]);
        let without = extracts(&["CUDA Toolkit 12.4 introduces"]);
        assert!(version_present("cuda 12.6 release notes", &with));
        assert!(!version_present("cuda 12.6 release notes", &without));
        assert!(version_present("no version here", &without));
    }
}
