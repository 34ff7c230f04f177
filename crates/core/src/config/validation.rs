//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

const MAX_ITEMS: usize = 1000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// Required fields are not checked here; see [`AppConfig::output`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `num_items` is 0 or exceeds 1000
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `source_url` or `feed_link` is set but not an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_items == 0 {
            return Err(ConfigError::Invalid { field: "num_items".into(), reason: "must be greater than 0".into() });
        }
        if self.num_items > MAX_ITEMS {
            return Err(ConfigError::Invalid {
                field: "num_items".into(),
                reason: format!("must not exceed {MAX_ITEMS}"),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if let Some(source_url) = &self.source_url {
            check_http_url("source_url", source_url)?;
        }
        if let Some(feed_link) = &self.feed_link {
            check_http_url("feed_link", feed_link)?;
        }

        if self.selector.as_deref().is_some_and(|s| s.trim().is_empty()) {
            tracing::warn!("selector is set but blank; a rebuild will refuse to run");
        }

        Ok(())
    }
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value.trim())
        .map_err(|e| ConfigError::Invalid { field: field.into(), reason: format!("invalid URL: {e}") })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid { field: field.into(), reason: format!("unsupported scheme: {scheme}") }),
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
    fn test_validate_num_items_zero() {
        let config = AppConfig { num_items: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "num_items"));
    }

    #[test]
    fn test_validate_num_items_exceeds_limit() {
        let config = AppConfig { num_items: MAX_ITEMS + 1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "num_items"));
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() }; // 5min 1sec
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: " ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_source_url_scheme() {
        let config = AppConfig { source_url: Some("ftp://example.com/feed".into()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "source_url"));

        let config = AppConfig { source_url: Some("not a url".into()), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_feed_link() {
        let config = AppConfig { feed_link: Some("https://mirror.example.com/".into()), ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { feed_link: Some("/relative".into()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "feed_link"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { num_items: 1, max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
