//! Client for the hosted auth REST API (`/auth/v1`)
//!
//! Thin request/response layer: no state, no events. Session bookkeeping
//! lives in [`super::remote::RemoteAuthBackend`].

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use studyhub_domain::constants::AUTH_API_PREFIX;
use studyhub_domain::{BackendConfig, Identity, Result, Session, SignUpAttributes};
use tracing::{debug, instrument};

use super::response::{ensure_success, read_json};
use crate::http::HttpClient;

/// Token payload returned by the password and refresh grants.
///
/// `expires_at` arrives as Unix seconds and is converted on the way in.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: Identity,
}

impl From<TokenResponse> for Session {
    fn from(value: TokenResponse) -> Self {
        let mut session =
            Self::new(value.access_token, value.refresh_token, value.expires_in, value.user);
        if let Some(expires_at) =
            value.expires_at.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        {
            session.expires_at = Some(expires_at);
        }
        if let Some(token_type) = value.token_type {
            session.token_type = token_type;
        }
        session
    }
}

/// Signup answers with a session when the project auto-confirms accounts,
/// otherwise with the bare user awaiting email confirmation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(Identity),
}

/// Result of a registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is usable immediately.
    SignedIn(Session),
    /// The account exists but must be confirmed first.
    ConfirmationPending(Identity),
}

impl SignUpOutcome {
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        match self {
            Self::SignedIn(session) => &session.identity,
            Self::ConfirmationPending(identity) => identity,
        }
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a SignUpAttributes,
}

/// Stateless client for the auth endpoints.
#[derive(Clone)]
pub struct AuthApi {
    http: HttpClient,
    base_url: String,
    anon_key: String,
}

impl AuthApi {
    pub fn new(http: HttpClient, config: &BackendConfig) -> Self {
        Self {
            http,
            base_url: format!("{}{AUTH_API_PREFIX}", config.base_url()),
            anon_key: config.anon_key.clone(),
        }
    }

    /// Exchange email + password for a session.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let request = self
            .http
            .request(Method::POST, format!("{}/token?grant_type=password", self.base_url))
            .bearer_auth(&self.anon_key)
            .json(&PasswordGrant { email, password });

        let token: TokenResponse = read_json(self.http.send(request).await?).await?;
        debug!(identity_id = %token.user.id, "password grant succeeded");
        Ok(token.into())
    }

    /// Exchange a refresh token for a new session.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let request = self
            .http
            .request(Method::POST, format!("{}/token?grant_type=refresh_token", self.base_url))
            .bearer_auth(&self.anon_key)
            .json(&RefreshGrant { refresh_token });

        let token: TokenResponse = read_json(self.http.send(request).await?).await?;
        debug!(identity_id = %token.user.id, "refresh grant succeeded");
        Ok(token.into())
    }

    /// Register a new account with `attributes` as user metadata.
    #[instrument(skip(self, password, attributes))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &SignUpAttributes,
    ) -> Result<SignUpOutcome> {
        let request = self
            .http
            .request(Method::POST, format!("{}/signup", self.base_url))
            .bearer_auth(&self.anon_key)
            .json(&SignUpRequest { email, password, data: attributes });

        let outcome = match read_json(self.http.send(request).await?).await? {
            SignUpResponse::Session(token) => SignUpOutcome::SignedIn(token.into()),
            SignUpResponse::User(identity) => SignUpOutcome::ConfirmationPending(identity),
        };
        debug!(identity_id = %outcome.identity().id, "signup accepted");
        Ok(outcome)
    }

    /// Revoke the session that `access_token` belongs to.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self
            .http
            .request(Method::POST, format!("{}/logout", self.base_url))
            .bearer_auth(access_token);

        ensure_success(self.http.send(request).await?).await?;
        Ok(())
    }
}
