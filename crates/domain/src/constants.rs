//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Hosted backend routes
pub const AUTH_API_PREFIX: &str = "/auth/v1";
pub const REST_API_PREFIX: &str = "/rest/v1";
pub const PROFILES_TABLE: &str = "profiles";

/// PostgREST error code for "single object requested, zero rows returned".
/// A freshly registered identity hits this until the profile trigger runs.
pub const PROFILE_NOT_FOUND_CODE: &str = "PGRST116";

// Session lifecycle
pub const DEFAULT_REFRESH_THRESHOLD_SECONDS: i64 = 300;
pub const AUTO_REFRESH_IDLE_RECHECK_SECS: u64 = 60;
pub const AUTO_REFRESH_RETRY_SECS: u64 = 60;
/// Upper bound on the pause between back-to-back refreshes of a token whose
/// lifetime is shorter than the refresh threshold.
pub const AUTO_REFRESH_MIN_INTERVAL_SECS: i64 = 30;
pub const DEFAULT_SESSION_FILE: &str = ".studyhub/session.json";
pub const DEFAULT_TOKEN_TYPE: &str = "bearer";

// HTTP defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const RETRY_BASE_BACKOFF_MS: u64 = 200;
pub const CLIENT_INFO_HEADER: &str = "x-client-info";
pub const CLIENT_INFO: &str = concat!("studyhub-rs/", env!("CARGO_PKG_VERSION"));

// Registration rules
pub const MIN_PASSWORD_LENGTH: usize = 6;
