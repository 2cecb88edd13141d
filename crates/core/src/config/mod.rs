//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (KESTREL_*)
//! 2. TOML config file (if KESTREL_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded value is immutable and threaded into the orchestrator's entry
//! point; nothing in the pipeline consults process-wide state.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (KESTREL_*)
/// 2. TOML config file (if KESTREL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default generative model id passed to the backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Ollama-compatible generative backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Whether the web resolver stage may run at all.
    #[serde(default)]
    pub web_enabled: bool,

    /// Force the web stage even when the recency heuristic says no.
    #[serde(default)]
    pub force_web: bool,

    /// Strip emoji and normalize whitespace in the final scrub.
    #[serde(default)]
    pub no_emoji: bool,

    /// Allow skills to perform bounded live lookups (fx rates, weather).
    /// When false they fall back to offline fixtures.
    #[serde(default)]
    pub live_skills: bool,

    /// Maximum documents considered per web search pass.
    #[serde(default = "default_max_docs")]
    pub max_docs: usize,

    /// Token budget handed to web synthesis.
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per document.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Timeout for search and per-document fetches, in milliseconds.
    #[serde(default = "default_web_timeout_ms")]
    pub web_timeout_ms: u64,

    /// Timeout for generative backend calls, in milliseconds.
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,

    /// TTL for persistent answer records, in seconds.
    #[serde(default = "default_answer_ttl")]
    pub answer_ttl_secs: i64,

    /// Version salt mixed into semantic cache keys.
    #[serde(default = "default_version_salt")]
    pub version_salt: String,

    /// Path to the SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path to the JSON preference store.
    #[serde(default = "default_prefs_path")]
    pub prefs_path: PathBuf,

    /// Path to the JSONL memory store.
    #[serde(default = "default_memory_path")]
    pub memory_path: PathBuf,
}

fn default_model() -> String {
    "nous-hermes-13b-fast:latest".into()
}

fn default_backend_url() -> String {
    "http://localhost:11434".into()
}

fn default_max_docs() -> usize {
    6
}

fn default_token_budget() -> usize {
    800
}

fn default_user_agent() -> String {
    "kestrel/0.1".into()
}

fn default_max_bytes() -> usize {
    2_097_152 // 2MB
}

fn default_web_timeout_ms() -> u64 {
    12_000
}

fn default_backend_timeout_ms() -> u64 {
    45_000
}

fn default_answer_ttl() -> i64 {
    3600
}

fn default_version_salt() -> String {
    "dev".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./kestrel-cache.sqlite")
}

fn default_prefs_path() -> PathBuf {
    PathBuf::from("./kestrel-prefs.json")
}

fn default_memory_path() -> PathBuf {
    PathBuf::from("./kestrel-memory.jsonl")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            backend_url: default_backend_url(),
            web_enabled: false,
            force_web: false,
            no_emoji: false,
            live_skills: false,
            max_docs: default_max_docs(),
            token_budget: default_token_budget(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            web_timeout_ms: default_web_timeout_ms(),
            backend_timeout_ms: default_backend_timeout_ms(),
            answer_ttl_secs: default_answer_ttl(),
            version_salt: default_version_salt(),
            db_path: default_db_path(),
            prefs_path: default_prefs_path(),
            memory_path: default_memory_path(),
        }
    }
}

impl AppConfig {
    /// Web timeout as a Duration for use with reqwest/tokio.
    pub fn web_timeout(&self) -> Duration {
        Duration::from_millis(self.web_timeout_ms)
    }

    /// Backend timeout as a Duration.
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `KESTREL_`
    /// 2. TOML file from `KESTREL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, the environment
    /// cannot be parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("KESTREL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("KESTREL_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model, "nous-hermes-13b-fast:latest");
        assert_eq!(config.max_docs, 6);
        assert_eq!(config.token_budget, 800);
        assert_eq!(config.answer_ttl_secs, 3600);
        assert!(!config.web_enabled);
        assert!(!config.force_web);
        assert!(!config.no_emoji);
        assert!(!config.live_skills);
    }

    #[test]
    fn test_timeout_durations() {
        let config = AppConfig::default();
        assert_eq!(config.web_timeout(), Duration::from_millis(12_000));
        assert_eq!(config.backend_timeout(), Duration::from_millis(45_000));
    }
}
