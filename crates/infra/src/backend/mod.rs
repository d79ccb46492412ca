//! Adapters for the hosted auth + Postgres backend
//!
//! - [`auth_api`]: stateless auth REST client
//! - [`profiles`]: `profiles` table over the REST API
//! - [`remote`]: stateful [`studyhub_core::AuthBackend`] with persistence,
//!   event publishing and background token refresh

pub mod auth_api;
pub mod profiles;
pub mod remote;
mod response;

pub use auth_api::{AuthApi, SignUpOutcome};
pub use profiles::RestProfileRepository;
pub use remote::RemoteAuthBackend;

/// Source of the bearer token for user-scoped requests.
pub trait AccessTokenProvider: Send + Sync {
    /// Access token of the signed-in user, if any.
    fn access_token(&self) -> Option<String>;
}
