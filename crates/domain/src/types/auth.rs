//! Session and identity types issued by the hosted auth service
//!
//! A [`Session`] is an opaque credential bundle. It is replaced wholesale on
//! refresh and never mutated in place; the only mutation helper,
//! [`Session::refresh_expiry_timestamp`], exists for sessions rehydrated from
//! storage that lack an absolute expiry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TOKEN_TYPE;

/// The authenticated principal: a stable id and an email-like label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self { id: id.into(), email }
    }
}

/// Credential bundle representing an authenticated connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// JWT access token for API authentication
    pub access_token: String,

    /// Refresh token for obtaining a replacement session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Principal this session was issued to
    #[serde(rename = "user")]
    pub identity: Identity,
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

impl Session {
    /// Create a session with `expires_at` derived from `expires_in`.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        identity: Identity,
    ) -> Self {
        let expires_at =
            if expires_in > 0 { Some(Utc::now() + Duration::seconds(expires_in)) } else { None };

        Self {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            expires_in,
            expires_at,
            identity,
        }
    }

    /// Id of the identity this session belongs to.
    #[must_use]
    pub fn identity_id(&self) -> &str {
        &self.identity.id
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold. Sessions without an expiry never expire.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(threshold_seconds) >= expires_at,
            None => false,
        }
    }

    /// Seconds until expiry, or `None` when no expiry is known.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Whether `self` supersedes `other` for the same identity.
    ///
    /// A refreshed session always carries a later expiry than the one it
    /// replaced, so expiry order is issue order.
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        match (self.expires_at, other.expires_at) {
            (Some(mine), Some(theirs)) => mine > theirs,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Recalculate `expires_at` from `expires_in` when it is missing.
    pub fn refresh_expiry_timestamp(&mut self) {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(Utc::now() + Duration::seconds(self.expires_in));
        }
    }
}

/// Kind of a session-change notification pushed by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

crate::impl_wire_name_conversions!(SessionEventKind {
    InitialSession => "INITIAL_SESSION",
    SignedIn => "SIGNED_IN",
    SignedOut => "SIGNED_OUT",
    TokenRefreshed => "TOKEN_REFRESHED",
    UserUpdated => "USER_UPDATED",
    PasswordRecovery => "PASSWORD_RECOVERY",
});

/// A session-change notification, delivered in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub session: Option<Session>,
}

impl SessionEvent {
    #[must_use]
    pub const fn new(kind: SessionEventKind, session: Option<Session>) -> Self {
        Self { kind, session }
    }

    #[must_use]
    pub const fn signed_in(session: Session) -> Self {
        Self::new(SessionEventKind::SignedIn, Some(session))
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self::new(SessionEventKind::SignedOut, None)
    }

    #[must_use]
    pub const fn token_refreshed(session: Session) -> Self {
        Self::new(SessionEventKind::TokenRefreshed, Some(session))
    }
}

/// Extra attributes attached to a new identity at registration.
///
/// The backend's `handle_new_user` trigger copies `username` into the
/// profile row it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpAttributes {
    pub username: String,
}
