//! Guarded web synthesis.
//!
//! One resolution pass is: candidate links (fastpath table first, engine
//! search when it yields no readable document), fetch and clean each
//! candidate, run the weak-match and version guards,
//! then a single strictly-instructed generative call that must cite its
//! sources or refuse. Output failing any guard is discarded with a named
//! reason, never patched up.
//!
//! `resolve` wraps the pass with exactly one adaptive retry on a refined
//! query; total attempts are bounded at two.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::heuristics::refine_query;
use crate::traits::{DocumentFetcher, Generator, SearchProvider};
use kestrel_client::ChatMessage;

pub mod fastpath;
pub mod guards;

/// The literal refusal the synthesis prompt demands on insufficient
/// extracts.
pub const REFUSAL_SENTINEL: &str = "(no web results)";

/// Per-document extract bound, in characters.
const EXTRACT_CHARS: usize = 1200;

/// One fetched and cleaned candidate document.
#[derive(Debug, Clone)]
pub struct WebDocument {
    pub title: String,
    pub url: String,
    pub extract: String,
}

/// Metadata accompanying a synthesis outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebMeta {
    pub web_used: bool,
    pub links: Vec<String>,
    /// Guard or backend reason when `web_used` is false.
    pub reason: Option<String>,
}

/// Outcome of one `resolve` call. Empty text means the web stage produced
/// nothing usable; the caller falls through.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub text: String,
    pub meta: WebMeta,
}

impl SynthesisResult {
    fn rejected(links: Vec<String>, reason: &str) -> Self {
        Self { text: String::new(), meta: WebMeta { web_used: false, links, reason: Some(reason.to_string()) } }
    }

    /// Usable means non-empty text backed by at least one link.
    pub fn usable(&self) -> bool {
        !self.text.trim().is_empty() && !self.meta.links.is_empty()
    }
}

/// Search, fetch, validate, synthesize.
pub struct WebResolver {
    search: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn DocumentFetcher>,
    generator: Arc<dyn Generator>,
    max_docs: usize,
    model: String,
}

impl WebResolver {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn DocumentFetcher>,
        generator: Arc<dyn Generator>,
        max_docs: usize,
        model: impl Into<String>,
    ) -> Self {
        Self { search, fetcher, generator, max_docs, model: model.into() }
    }

    /// Resolve with one adaptive retry. The retry fires only when the
    /// first pass yielded no usable text, and only when the query can be
    /// conservatively refined.
    pub async fn resolve(&self, query: &str, budget_tokens: usize) -> SynthesisResult {
        let first = self.attempt(query, budget_tokens).await;
        if first.usable() {
            return first;
        }

        if let Some(refined) = refine_query(query) {
            tracing::debug!("web retry with refined query: {}", refined);
            let second = self.attempt(&refined, budget_tokens).await;
            if second.usable() {
                return second;
            }
        }

        first
    }

    async fn attempt(&self, query: &str, budget_tokens: usize) -> SynthesisResult {
        // Known-source fastpath links are tried first; when none produce a
        // readable document the engine search is consulted instead.
        let fast: Vec<(String, String)> =
            fastpath::known_urls(query).into_iter().map(|u| (u.to_string(), u.to_string())).collect();
        let mut attempted: Vec<String> = fast.iter().map(|(_, u)| u.clone()).collect();
        let mut docs = self.fetch_docs(&fast).await;

        if docs.is_empty() {
            let candidates: Vec<(String, String)> = match self.search.search(query, self.max_docs).await {
                Ok(hits) => hits.into_iter().map(|h| (h.title, h.url)).collect(),
                Err(e) => {
                    tracing::debug!("search failed: {}", e);
                    Vec::new()
                }
            };
            attempted.extend(candidates.iter().map(|(_, u)| u.clone()));
            docs = self.fetch_docs(&candidates).await;
        }

        if docs.is_empty() {
            return SynthesisResult {
                text: String::new(),
                meta: WebMeta { web_used: false, links: attempted, reason: None },
            };
        }

        let links: Vec<String> = docs.iter().map(|d| d.url.clone()).collect();
        let extracts: Vec<String> = docs.iter().map(|d| format!("[{}] {}", d.title, d.extract)).collect();

        if !guards::weak_match(query, &extracts) {
            return SynthesisResult::rejected(links, "weak_match");
        }
        if !guards::version_present(query, &extracts) {
            return SynthesisResult::rejected(links, "version_not_present");
        }

        let prompt = build_prompt(query, &docs, &extracts, budget_tokens);
        let text = self
            .generator
            .generate(&[ChatMessage::user(prompt)], &self.model)
            .await
            .unwrap_or_default()
            .trim()
            .to_string();

        if text.is_empty() || text == REFUSAL_SENTINEL {
            return SynthesisResult::rejected(links, "model_no_result");
        }
        if !has_citation(&text) {
            return SynthesisResult::rejected(links, "no_citations");
        }

        SynthesisResult { text, meta: WebMeta { web_used: true, links, reason: None } }
    }

    /// Fetch and clean candidates, dropping unreadable documents.
    async fn fetch_docs(&self, candidates: &[(String, String)]) -> Vec<WebDocument> {
        let mut docs = Vec::new();
        for (title, url) in candidates.iter().take(self.max_docs) {
            let Some(text) = self.fetcher.fetch_clean(url).await else {
                continue;
            };
            let title = if title.is_empty() {
                let line = kestrel_client::first_line_title(&text);
                if line.is_empty() { url.clone() } else { line }
            } else {
                title.clone()
            };
            docs.push(WebDocument { title, url: url.clone(), extract: truncate_chars(&text, EXTRACT_CHARS) });
        }
        docs
    }
}

/// The strict synthesis prompt: answer only from extracts, 3-6 cited
/// bullets, or the refusal sentinel.
fn build_prompt(query: &str, docs: &[WebDocument], extracts: &[String], budget_tokens: usize) -> String {
    let cites = docs
        .iter()
        .enumerate()
        .map(|(i, d)| format!("[{}] {} ({})", i + 1, d.title, d.url))
        .collect::<Vec<_>>()
        .join("\n");
    let body = truncate_chars(&extracts.join("\n\n"), (budget_tokens * 8).max(400));

    format!(
        "You are a strict, concise researcher.\n\
         Use ONLY the Extracts. If they don't clearly answer, reply exactly: {REFUSAL_SENTINEL}\n\
         Output: 3-6 short bullets with [#] citations. No fluff.\n\n\
         Question: {query}\n\nSources:\n{cites}\n\nExtracts:\n{body}\n"
    )
}

/// True when the text carries at least one `[n]` citation marker.
fn has_citation(text: &str) -> bool {
    use std::sync::LazyLock;
    static CITE_RE: LazyLock<regex::Regex> = LazyLock::new(|| regex::Regex::new(r"\[\d+\]").unwrap());
    CITE_RE.is_match(text)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars { s.to_string() } else { s.chars().take(max_chars).collect() }
}
