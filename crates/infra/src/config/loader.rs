//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required ones are missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STUDYHUB_BACKEND_URL`: Backend project URL (required)
//! - `STUDYHUB_ANON_KEY`: Public anon key (required)
//! - `STUDYHUB_REQUEST_TIMEOUT`: Request timeout in seconds
//! - `STUDYHUB_MAX_ATTEMPTS`: Attempts per request (initial try + retries)
//! - `STUDYHUB_PERSIST_SESSION`: Whether the session is persisted (true/false)
//! - `STUDYHUB_SESSION_PATH`: Where the persisted session is stored
//! - `STUDYHUB_AUTO_REFRESH`: Whether tokens are refreshed in the background
//! - `STUDYHUB_REFRESH_THRESHOLD`: Seconds before expiry to refresh
//! - `STUDYHUB_LOG_LEVEL`: Default log filter
//! - `STUDYHUB_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` or `./studyhub.{json,toml}` (current directory)
//! 2. `../config.{json,toml}`, `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use studyhub_domain::{BackendConfig, Config, LoggingConfig, Result, SessionConfig, StudyHubError};

use crate::errors::InfraError;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file. The
/// result is validated either way.
///
/// # Errors
/// Returns `StudyHubError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `STUDYHUB_BACKEND_URL` and `STUDYHUB_ANON_KEY` must be present; every
/// other variable falls back to its default.
///
/// # Errors
/// Returns `StudyHubError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let mut backend =
        BackendConfig::new(env_var("STUDYHUB_BACKEND_URL")?, env_var("STUDYHUB_ANON_KEY")?);
    if let Some(timeout) = env_parse("STUDYHUB_REQUEST_TIMEOUT")? {
        backend.request_timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse("STUDYHUB_MAX_ATTEMPTS")? {
        backend.max_attempts = attempts;
    }

    let defaults = SessionConfig::default();
    let session = SessionConfig {
        persist: env_bool("STUDYHUB_PERSIST_SESSION", defaults.persist),
        storage_path: std::env::var("STUDYHUB_SESSION_PATH").ok().or(defaults.storage_path),
        auto_refresh: env_bool("STUDYHUB_AUTO_REFRESH", defaults.auto_refresh),
        refresh_threshold_seconds: env_parse("STUDYHUB_REFRESH_THRESHOLD")?
            .unwrap_or(defaults.refresh_threshold_seconds),
    };

    let defaults = LoggingConfig::default();
    let logging = LoggingConfig {
        level: std::env::var("STUDYHUB_LOG_LEVEL").unwrap_or(defaults.level),
        json: env_bool("STUDYHUB_LOG_JSON", defaults.json),
    };

    Ok(Config { backend, session, logging })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `StudyHubError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StudyHubError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StudyHubError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StudyHubError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StudyHubError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(StudyHubError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 8] = [
        "config.json",
        "config.toml",
        "studyhub.json",
        "studyhub.toml",
        "../config.json",
        "../config.toml",
        "../../config.json",
        "../../config.toml",
    ];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `StudyHubError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            StudyHubError::Config(format!("Missing required environment variable: {key}"))
        })
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `StudyHubError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| StudyHubError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
