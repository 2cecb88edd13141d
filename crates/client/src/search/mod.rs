//! DuckDuckGo search client.
//!
//! Queries the HTML endpoint first and falls back to the lite endpoint
//! when it comes back short. Both return server-rendered markup, so result
//! extraction is plain anchor scraping; no API key involved.
//!
//! Results are normalized into stable `SearchHit` pairs, deduplicated by
//! URL, and capped at the caller's limit.

use std::time::{Duration, Instant};

use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use kestrel_core::Error;

/// Default HTML endpoint.
const HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Fallback lite endpoint.
const LITE_ENDPOINT: &str = "https://duckduckgo.com/lite/";

/// Search client configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// User-agent string (default: kestrel/0.1).
    pub user_agent: String,
    /// Request timeout (default: 12s).
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { user_agent: "kestrel/0.1".to_string(), timeout: Duration::from_millis(12_000) }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// DuckDuckGo search client.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    config: SearchConfig,
}

impl SearchClient {
    /// Create a new search client with the given configuration.
    pub fn new(config: SearchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| Error::SearchFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Run a search, returning at most `max_results` ranked hits.
    ///
    /// The HTML endpoint is tried first; if it yields fewer than
    /// `max_results` hits the lite endpoint tops the list up. Either
    /// endpoint failing alone is not an error.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".into()));
        }

        let start = Instant::now();
        let mut hits = Vec::new();

        match self.engine(HTML_ENDPOINT, query).await {
            Ok(body) => hits.extend(parse_anchors(&body, max_results)),
            Err(e) => tracing::debug!("html endpoint failed: {}", e),
        }

        if hits.len() < max_results {
            match self.engine(LITE_ENDPOINT, query).await {
                Ok(body) => hits.extend(parse_anchors(&body, max_results)),
                Err(e) => tracing::debug!("lite endpoint failed: {}", e),
            }
        }

        let hits = dedup_by_url(hits, max_results);
        tracing::debug!("search '{}' returned {} hits in {:?}", query, hits.len(), start.elapsed());
        Ok(hits)
    }

    async fn engine(&self, endpoint: &str, query: &str) -> Result<String, Error> {
        let response = self
            .http
            .get(endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| Error::SearchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::SearchFailed(format!("status {}", response.status().as_u16())));
        }

        response.text().await.map_err(|e| Error::SearchFailed(e.to_string()))
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// Extract external result anchors from a results page.
fn parse_anchors(body: &str, cap: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(body);
    let anchor = Selector::parse("a[href]").unwrap();

    let mut hits = Vec::new();
    for a in doc.select(&anchor) {
        let Some(href) = a.value().attr("href") else { continue };
        if !href.starts_with("http") || href.contains("duckduckgo.com") {
            continue;
        }
        let text: String = a.text().collect::<String>().trim().chars().take(120).collect();
        let title = if text.is_empty() { href.to_string() } else { text };
        hits.push(SearchHit { title, url: href.to_string() });
        if hits.len() >= cap {
            break;
        }
    }
    hits
}

/// Keep the first occurrence of each URL, bounded at `cap`.
fn dedup_by_url(hits: Vec<SearchHit>, cap: usize) -> Vec<SearchHit> {
    let mut seen = std::collections::HashSet::new();
    hits.into_iter()
        .filter(|h| seen.insert(h.url.clone()))
        .take(cap)
        .collect()
}
