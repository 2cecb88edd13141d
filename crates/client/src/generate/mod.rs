//! Generative backend client (Ollama-compatible).
//!
//! Talks to an Ollama `/api/generate` endpoint. Chat-style messages are
//! flattened into a single role-tagged prompt so the same path serves both
//! plain prompts and persona-composed system stacks. Usage counters come
//! back in `GenUsage`; any transport or decode failure is a `GenError`
//! that callers degrade to empty text.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Errors from the generative backend.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("backend timeout")]
    Timeout,

    #[error("backend network error: {0}")]
    Network(String),

    #[error("backend returned status {0}")]
    Http(u16),

    #[error("backend response could not be parsed: {0}")]
    Parse(String),
}

/// Message role in a chat exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Usage metadata from a completed call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenUsage {
    pub total_duration: Option<i64>,
    pub load_duration: Option<i64>,
    pub prompt_eval_count: Option<i64>,
    pub prompt_eval_duration: Option<i64>,
    pub eval_count: Option<i64>,
    pub eval_duration: Option<i64>,
}

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Base URL (default: http://localhost:11434).
    pub base_url: String,
    /// Request timeout (default: 45s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout: Duration::from_secs(45),
            user_agent: "kestrel/0.1".to_string(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    total_duration: Option<i64>,
    load_duration: Option<i64>,
    prompt_eval_count: Option<i64>,
    prompt_eval_duration: Option<i64>,
    eval_count: Option<i64>,
    eval_duration: Option<i64>,
}

/// Ollama-compatible generation client.
#[derive(Debug, Clone)]
pub struct GenClient {
    http: Client,
    config: GenConfig,
}

impl GenClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GenConfig) -> Result<Self, GenError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenError::Network(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Run one generation call.
    ///
    /// `stream` is accepted for interface parity but the call always
    /// completes before returning; partial output is never surfaced.
    pub async fn chat(&self, messages: &[ChatMessage], model: &str, _stream: bool) -> Result<(String, GenUsage), GenError> {
        let start = Instant::now();
        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let request = GenerateRequest { model, prompt: build_prompt(messages), stream: false };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { GenError::Timeout } else { GenError::Network(e.to_string()) })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenError::Http(status.as_u16()));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| GenError::Parse(e.to_string()))?;

        let usage = GenUsage {
            total_duration: body.total_duration,
            load_duration: body.load_duration,
            prompt_eval_count: body.prompt_eval_count,
            prompt_eval_duration: body.prompt_eval_duration,
            eval_count: body.eval_count,
            eval_duration: body.eval_duration,
        };

        tracing::debug!(
            "generation for model {} completed in {:?} ({} eval tokens)",
            model,
            start.elapsed(),
            usage.eval_count.unwrap_or(0)
        );

        Ok((body.response.trim().to_string(), usage))
    }

    /// A one-token call that lets the backend load the model.
    pub async fn warm(&self, model: &str) -> Result<u64, GenError> {
        let start = Instant::now();
        self.chat(&[ChatMessage::user(".")], model, false).await?;
        Ok(start.elapsed().as_millis() as u64)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &GenConfig {
        &self.config
    }
}

/// Flatten chat messages into a role-tagged prompt for `/api/generate`.
fn build_prompt(messages: &[ChatMessage]) -> String {
    let mut lines = Vec::with_capacity(messages.len() + 1);
    for m in messages {
        let content = m.content.trim();
        match m.role {
            Role::System => lines.push(format!("[SYS] {}", content)),
            Role::User => lines.push(format!("User: {}", content)),
            Role::Assistant => lines.push(format!("Assistant: {}", content)),
        }
    }
    lines.push("Assistant:".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_roles() {
        let messages = [
            ChatMessage::system("be brief"),
            ChatMessage::user("hello"),
            ChatMessage { role: Role::Assistant, content: "hi".into() },
        ];
        let prompt = build_prompt(&messages);
        assert_eq!(prompt, "[SYS] be brief\nUser: hello\nAssistant: hi\nAssistant:");
    }

    #[test]
    fn test_build_prompt_empty() {
        assert_eq!(build_prompt(&[]), "Assistant:");
    }

    #[test]
    fn test_client_new() {
        assert!(GenClient::new(GenConfig::default()).is_ok());
    }
}
