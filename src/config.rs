//! Configuration file parser for ~/.config/quotewall/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{default_tag_categories, Catalog};
use crate::feed::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_PROXIES, URL_PLACEHOLDER};
use crate::refresh::{
    RefreshSettings, DEFAULT_AUTO_REFRESH_INTERVAL, DEFAULT_CACHE_MAX_AGE, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_DELAY,
};
use crate::theme::ThemeVariant;
use crate::util::validate_http_url;

pub const DEFAULT_FEED_URL: &str =
    "https://rsshub.app/jike/user/16120E35-EB4B-4FF1-9DBC-9BEFC1D16CCD";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: String, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS/Atom document to display.
    pub feed_url: String,

    /// Proxy templates tried in order after the direct request. `{url}` is
    /// replaced by the encoded feed URL; without it the URL is appended.
    pub proxies: Vec<String>,

    /// Timeout for each individual fetch attempt.
    pub request_timeout_secs: u64,

    /// How long a cached fetch counts as fresh at startup.
    pub cache_max_age_minutes: u64,

    /// Automatic retries after a failed fetch.
    pub max_retries: u32,

    pub retry_delay_secs: u64,

    /// Background refresh interval in minutes. 0 disables it.
    pub auto_refresh_minutes: u64,

    /// "dark" or "light". A saved theme preference wins over this.
    pub theme: String,

    /// When non-empty, only posts carrying one of these hashtags are shown.
    pub only_tags: Vec<String>,

    /// Category for posts without a mapped hashtag.
    pub default_category: String,

    /// Hashtag → category key.
    pub tag_categories: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            proxies: DEFAULT_PROXIES.iter().map(|p| p.to_string()).collect(),
            request_timeout_secs: DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
            cache_max_age_minutes: DEFAULT_CACHE_MAX_AGE.as_secs() / 60,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY.as_secs(),
            auto_refresh_minutes: DEFAULT_AUTO_REFRESH_INTERVAL.as_secs() / 60,
            theme: "dark".to_string(),
            only_tags: Vec::new(),
            default_category: "life".to_string(),
            tag_categories: default_tag_categories(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 11] = [
        "feed_url",
        "proxies",
        "request_timeout_secs",
        "cache_max_age_minutes",
        "max_retries",
        "retry_delay_secs",
        "auto_refresh_minutes",
        "theme",
        "only_tags",
        "default_category",
        "tag_categories",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Unusable feed or proxy URL → `Err(ConfigError::InvalidUrl)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(
            feed_url = %config.feed_url,
            proxies = config.proxies.len(),
            theme = %config.theme,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_url("feed_url", &self.feed_url)?;
        for (i, proxy) in self.proxies.iter().enumerate() {
            // The template is only a URL once the placeholder is filled.
            let sample = proxy.replace(URL_PLACEHOLDER, "x");
            check_url(&format!("proxies[{i}]"), &sample)?;
        }
        Ok(())
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            max_retries: self.max_retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            auto_refresh_interval: (self.auto_refresh_minutes > 0)
                .then(|| Duration::from_secs(self.auto_refresh_minutes * 60)),
            cache_max_age: Duration::from_secs(self.cache_max_age_minutes * 60),
        }
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.only_tags.clone(),
            self.default_category.clone(),
            self.tag_categories.clone(),
        )
    }

    /// Configured theme; unknown names fall back to dark.
    pub fn theme_variant(&self) -> ThemeVariant {
        ThemeVariant::from_str_name(&self.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        })
    }
}

fn check_url(field: &str, raw: &str) -> Result<(), ConfigError> {
    validate_http_url(raw)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl {
            field: field.to_string(),
            reason: format!("{raw}: {e}"),
        })
}

// ============================================================================
// Tests
// ============================================================================
