use std::time::Duration;

use studyhub_domain::{LoggingConfig, Result, StudyHubError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. With `logging.json` set
/// every event is emitted as one JSON object per line.
///
/// # Errors
/// Returns `StudyHubError::Config` for an unparsable filter and
/// `StudyHubError::Internal` if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed =
        if config.json { builder.json().try_init() } else { builder.compact().try_init() };
    installed.map_err(|e| StudyHubError::Internal(format!("failed to install tracing: {e}")))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| {
        StudyHubError::Config(format!("logging.level '{}' is invalid: {e}", config.level))
    })
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` must be a stable identifier (e.g. `"session::sign_in"`) and
/// never carry credentials.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    outcome: std::result::Result<(), &StudyHubError>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(()) => info!(command, duration_ms, "command_execution_success"),
        Err(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Convert a `StudyHubError` into a stable label suitable for logging.
#[inline]
pub const fn error_label(error: &StudyHubError) -> &'static str {
    match error {
        StudyHubError::Config(_) => "config",
        StudyHubError::Network(_) => "network",
        StudyHubError::Auth(_) => "auth",
        StudyHubError::NotFound(_) => "not_found",
        StudyHubError::InvalidInput(_) => "invalid_input",
        StudyHubError::Serialization(_) => "serialization",
        StudyHubError::Storage(_) => "storage",
        StudyHubError::Internal(_) => "internal",
    }
}
