//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_docs` is 0 or exceeds 20
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - either timeout is under 100ms or over 5 minutes
    /// - `user_agent` or `model` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_docs == 0 || self.max_docs > 20 {
            return Err(ConfigError::Invalid {
                field: "max_docs".into(),
                reason: "must be between 1 and 20".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        for (field, ms) in [("web_timeout_ms", self.web_timeout_ms), ("backend_timeout_ms", self.backend_timeout_ms)] {
            if ms < 100 {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
            }
            if ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.model.is_empty() {
            return Err(ConfigError::Invalid { field: "model".into(), reason: "must not be empty".into() });
        }

        if self.answer_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                field: "answer_ttl_secs".into(),
                reason: "must be positive".into(),
            });
        }

        if self.force_web && !self.web_enabled {
            tracing::warn!("force_web is set but web_enabled is false; the web stage will still run");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_docs_zero() {
        let config = AppConfig { max_docs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_docs"));
    }

    #[test]
    fn test_validate_max_docs_exceeds_limit() {
        let config = AppConfig { max_docs: 21, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_docs"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { web_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "web_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_model() {
        let config = AppConfig { model: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "model"));
    }

    #[test]
    fn test_validate_negative_ttl() {
        let config = AppConfig { answer_ttl_secs: -1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "answer_ttl_secs"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_bytes: 1, web_timeout_ms: 100, backend_timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
