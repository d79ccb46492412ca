//! Port interfaces for the hosted auth + Postgres backend
//!
//! These traits define the boundary between the session synchronizer and the
//! infrastructure that talks to the external service. The synchronizer only
//! depends on the shapes below; wire formats belong to the adapters.

use async_trait::async_trait;
use studyhub_domain::{Identity, Profile, ProfileChanges, Result, Session, SignUpAttributes};

use super::events::SessionSubscription;

/// Authentication operations of the external service
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Current session, read from ambient persisted credentials.
    ///
    /// `Ok(None)` means nobody is signed in.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Subscribe to session-change notifications.
    ///
    /// Events are delivered in emission order until the returned handle is
    /// unsubscribed or dropped.
    fn subscribe(&self) -> SessionSubscription;

    /// Exchange email + password for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// Register a new identity.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &SignUpAttributes,
    ) -> Result<Identity>;

    /// Invalidate the current session.
    async fn sign_out(&self) -> Result<()>;
}

/// Access to the `profiles` table keyed by identity id
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the profile row for an identity.
    ///
    /// `Ok(None)` when the row does not exist (yet).
    async fn fetch_by_identity_id(&self, identity_id: &str) -> Result<Option<Profile>>;

    /// Apply `changes` to the identity's own row and return the updated row.
    async fn update(&self, identity_id: &str, changes: &ProfileChanges) -> Result<Profile>;
}

/// Persistence for the current session between process runs
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Persist `session`, replacing any previous one.
    async fn store(&self, session: &Session) -> Result<()>;

    /// Load the persisted session, if any.
    async fn retrieve(&self) -> Result<Option<Session>>;

    /// Remove the persisted session. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}

/// Type alias for auth backend trait object
pub type DynAuthBackend = dyn AuthBackend + Send + Sync + 'static;

/// Type alias for profile repository trait object
pub type DynProfileRepository = dyn ProfileRepository + Send + Sync + 'static;

/// Type alias for session storage trait object
pub type DynSessionStorage = dyn SessionStorage + Send + Sync + 'static;
