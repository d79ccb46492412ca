//! Configuration structures
//!
//! Loaded by `studyhub-infra::config::loader` from environment variables or a
//! TOML/JSON file. Everything except the backend URL and anon key has a
//! default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REFRESH_THRESHOLD_SECONDS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SESSION_FILE,
};
use crate::errors::{Result, StudyHubError};

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Public anon key sent as `apikey` on every request
    pub anon_key: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Total attempts per request (initial try + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

/// Session persistence and refresh behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_true")]
    pub persist: bool,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_seconds: i64,
}

/// Logging output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_true() -> bool {
    true
}

const fn default_refresh_threshold() -> i64 {
    DEFAULT_REFRESH_THRESHOLD_SECONDS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist: true,
            storage_path: None,
            auto_refresh: true,
            refresh_threshold_seconds: DEFAULT_REFRESH_THRESHOLD_SECONDS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

impl BackendConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl SessionConfig {
    /// Where the persisted session lives, falling back to the default file.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.as_deref().unwrap_or(DEFAULT_SESSION_FILE).into()
    }
}

impl Config {
    #[must_use]
    pub fn new(backend: BackendConfig) -> Self {
        Self { backend, session: SessionConfig::default(), logging: LoggingConfig::default() }
    }

    /// Reject configurations that cannot possibly work.
    ///
    /// # Errors
    /// Returns `StudyHubError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.backend.url).map_err(|e| {
            StudyHubError::Config(format!("backend.url '{}' is invalid: {e}", self.backend.url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StudyHubError::Config(format!(
                "backend.url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(StudyHubError::Config("backend.anon_key must not be empty".into()));
        }
        if self.backend.max_attempts == 0 {
            return Err(StudyHubError::Config("backend.max_attempts must be at least 1".into()));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(StudyHubError::Config(
                "backend.request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.session.refresh_threshold_seconds < 0 {
            return Err(StudyHubError::Config(
                "session.refresh_threshold_seconds must not be negative".into(),
            ));
        }
        Ok(())
    }
}
