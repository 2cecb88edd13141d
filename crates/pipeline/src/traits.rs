//! Collaborator seams for the pipeline.
//!
//! The web resolver and the model fallback talk to search, fetch, and the
//! generative backend through these traits, so tests can substitute
//! call-counting mocks and the pipeline never depends on concrete HTTP
//! types.

use async_trait::async_trait;

use kestrel_client::{ChatMessage, FetchClient, GenClient, SearchClient, SearchHit, clean_html};
use kestrel_core::Error;

/// Ranked web search.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return at most `max_results` ranked hits. May return fewer or none.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, Error>;
}

/// Fetch a URL and reduce it to cleaned text.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Cleaned text for `url`, or `None` when the fetch fails or the page
    /// cleans to nothing. Failure is not an error here; the resolver drops
    /// the document and moves on.
    async fn fetch_clean(&self, url: &str) -> Option<String>;
}

/// Generative backend.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run one generation call. Any backend failure surfaces as `None`;
    /// callers degrade to empty text.
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Option<String>;
}

#[async_trait]
impl SearchProvider for SearchClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, Error> {
        SearchClient::search(self, query, max_results).await
    }
}

#[async_trait]
impl DocumentFetcher for FetchClient {
    async fn fetch_clean(&self, url: &str) -> Option<String> {
        match self.fetch(url).await {
            Ok(response) => {
                let text = clean_html(&response.bytes);
                (!text.is_empty()).then_some(text)
            }
            Err(e) => {
                tracing::debug!("fetch of {} failed: {}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl Generator for GenClient {
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Option<String> {
        match self.chat(messages, model, false).await {
            Ok((text, _usage)) => Some(text),
            Err(e) => {
                tracing::warn!("generation failed: {}", e);
                None
            }
        }
    }
}
