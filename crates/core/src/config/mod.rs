//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Command-line overrides (any `Serialize` value, usually the CLI flags)
//! 2. Environment variables (REFEED_*)
//! 3. TOML config file (explicit path, or REFEED_CONFIG_FILE)
//! 4. Built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Whether a rebuilt feed is persisted unconditionally or only when the
/// source feed changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Always,
    #[default]
    Changed,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Always => f.write_str("always"),
            WriteMode::Changed => f.write_str("changed"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(WriteMode::Always),
            "changed" => Ok(WriteMode::Changed),
            other => Err(ConfigError::Invalid {
                field: "write_mode".into(),
                reason: format!("expected `always` or `changed`, got `{other}`"),
            }),
        }
    }
}

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// URL of the truncated source feed.
    ///
    /// Set via REFEED_SOURCE_URL. Required for a rebuild.
    #[serde(default)]
    pub source_url: Option<String>,

    /// CSS selector matching the article body on item pages.
    ///
    /// Set via REFEED_SELECTOR. Required for a rebuild.
    #[serde(default)]
    pub selector: Option<String>,

    /// Where the rebuilt feed is written.
    ///
    /// Set via REFEED_DESTINATION. Required for a rebuild.
    #[serde(default)]
    pub destination: Option<PathBuf>,

    /// Path to SQLite cache database.
    ///
    /// Set via REFEED_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via REFEED_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How many leading items of the source feed are rebuilt.
    ///
    /// Set via REFEED_NUM_ITEMS.
    #[serde(default = "default_num_items")]
    pub num_items: usize,

    /// Set via REFEED_WRITE_MODE (`always` or `changed`).
    #[serde(default)]
    pub write_mode: WriteMode,

    /// Replaces the source channel title in the output.
    #[serde(default)]
    pub feed_title: Option<String>,

    /// Replaces the source channel link in the output.
    #[serde(default)]
    pub feed_link: Option<String>,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via REFEED_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via REFEED_MAX_BYTES.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./refeed-cache.sqlite")
}

fn default_user_agent() -> String {
    "refeed/0.1".into()
}

fn default_num_items() -> usize {
    10
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            selector: None,
            destination: None,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            num_items: default_num_items(),
            write_mode: WriteMode::default(),
            feed_title: None,
            feed_link: None,
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

/// Everything the rebuild pipeline needs, with required fields resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub source_url: String,
    pub selector: String,
    pub num_items: usize,
    pub write_mode: WriteMode,
    pub feed_title: Option<String>,
    pub feed_link: Option<String>,
    /// HTTP settings the fetcher is built from.
    pub user_agent: String,
    pub timeout_ms: u64,
    pub max_bytes: usize,
    pub destination: PathBuf,
}

impl OutputConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration with `overrides` layered above every other source.
    ///
    /// Priority (highest wins):
    /// 1. `overrides` (fields serialized as absent are skipped)
    /// 2. Environment variables prefixed with `REFEED_`
    /// 3. TOML file from `config_file`, else from `REFEED_CONFIG_FILE`
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read or parsed
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load<T: Serialize>(
        config_file: Option<&Path>, overrides: &T,
    ) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("REFEED_CONFIG_FILE").map(PathBuf::from));
        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::LoadFailed(format!("config file {} does not exist", path.display())));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment
            .merge(
                Env::prefixed("REFEED_")
                    .ignore(&["config_file"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            )
            .merge(Serialized::defaults(overrides));

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Resolve the rebuild parameters, failing on any missing required field.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first absent field.
    pub fn output(&self) -> Result<OutputConfig, ConfigError> {
        let source_url = required(self.source_url.as_deref(), "source_url", "--source-url or REFEED_SOURCE_URL")?;
        let selector = required(self.selector.as_deref(), "selector", "--selector or REFEED_SELECTOR")?;
        let destination = self.destination.clone().ok_or_else(|| ConfigError::Missing {
            field: "destination".into(),
            hint: "Set --destination or REFEED_DESTINATION".into(),
        })?;

        Ok(OutputConfig {
            source_url,
            selector,
            num_items: self.num_items,
            write_mode: self.write_mode,
            feed_title: self.feed_title.clone(),
            feed_link: self.feed_link.clone(),
            user_agent: self.user_agent.clone(),
            timeout_ms: self.timeout_ms,
            max_bytes: self.max_bytes,
            destination,
        })
    }
}

fn required(value: Option<&str>, field: &str, source: &str) -> Result<String, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::Missing { field: field.into(), hint: format!("Set {source}") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Default)]
    struct Flags {
        #[serde(skip_serializing_if = "Option::is_none")]
        num_items: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        write_mode: Option<WriteMode>,
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./refeed-cache.sqlite"));
        assert_eq!(config.user_agent, "refeed/0.1");
        assert_eq!(config.num_items, 10);
        assert_eq!(config.write_mode, WriteMode::Changed);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_bytes, 5_242_880);
        assert!(config.source_url.is_none());
        assert!(config.feed_title.is_none());
    }

    #[test]
    fn test_write_mode_from_str() {
        assert_eq!("always".parse::<WriteMode>().unwrap(), WriteMode::Always);
        assert_eq!(" Changed ".parse::<WriteMode>().unwrap(), WriteMode::Changed);
        assert!(matches!("sometimes".parse::<WriteMode>(), Err(ConfigError::Invalid { .. })));
        assert_eq!(WriteMode::Always.to_string(), "always");
    }

    #[test]
    fn test_output_requires_fields() {
        let config = AppConfig { source_url: Some("https://example.com/rss".into()), ..Default::default() };
        let result = config.output();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "selector"));

        let config = AppConfig {
            source_url: Some("https://example.com/rss".into()),
            selector: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(config.output(), Err(ConfigError::Missing { field, .. }) if field == "selector"));
    }

    #[test]
    fn test_output_resolves() {
        let config = AppConfig {
            source_url: Some("https://example.com/rss".into()),
            selector: Some("div.post".into()),
            destination: Some(PathBuf::from("out/feed.xml")),
            feed_title: Some("Full".into()),
            write_mode: WriteMode::Always,
            num_items: 3,
            ..Default::default()
        };

        let output = config.output().unwrap();
        assert_eq!(output.source_url, "https://example.com/rss");
        assert_eq!(output.selector, "div.post");
        assert_eq!(output.destination, PathBuf::from("out/feed.xml"));
        assert_eq!(output.feed_title.as_deref(), Some("Full"));
        assert_eq!(output.feed_link, None);
        assert_eq!(output.write_mode, WriteMode::Always);
        assert_eq!(output.num_items, 3);
        assert_eq!(output.user_agent, "refeed/0.1");
        assert_eq!(output.timeout(), Duration::from_millis(20_000));
        assert_eq!(output.max_bytes, 5_242_880);
    }

    #[test]
    fn test_layered_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "refeed.toml",
                r#"
                    source_url = "https://file.example.com/rss"
                    selector = "article"
                    num_items = 5
                    write_mode = "always"
                "#,
            )?;
            jail.set_env("REFEED_SOURCE_URL", "https://env.example.com/rss");
            jail.set_env("REFEED_NUM_ITEMS", "7");

            let flags = Flags { num_items: Some(2), write_mode: None };
            let config = AppConfig::load(Some(Path::new("refeed.toml")), &flags)
                .map_err(|e| e.to_string())?;

            assert_eq!(config.source_url.as_deref(), Some("https://env.example.com/rss"));
            assert_eq!(config.selector.as_deref(), Some("article"));
            assert_eq!(config.num_items, 2);
            assert_eq!(config.write_mode, WriteMode::Always);
            Ok(())
        });
    }

    #[test]
    fn test_config_file_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "user_agent = \"custom-agent/2\"")?;
            jail.set_env("REFEED_CONFIG_FILE", "custom.toml");

            let config = AppConfig::load(None, &Flags::default()).map_err(|e| e.to_string())?;
            assert_eq!(config.user_agent, "custom-agent/2");
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file() {
        figment::Jail::expect_with(|_jail| {
            let result = AppConfig::load(Some(Path::new("absent.toml")), &Flags::default());
            assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
            Ok(())
        });
    }

    #[test]
    fn test_env_validation_failure() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("REFEED_NUM_ITEMS", "0");
            let result = AppConfig::load(None, &Flags::default());
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "num_items"));
            Ok(())
        });
    }
}
