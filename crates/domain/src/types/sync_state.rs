//! Aggregate state reflected from the remote auth session
//!
//! `SyncState` is only constructed through the transition helpers below, which
//! keep the invariants in one place:
//! - `is_admin` is true iff the held profile says so
//! - no session or profile is held without an identity
//! - `loading` is only true for the state created at process start

use serde::Serialize;

use super::auth::{Identity, Session};
use super::profile::Profile;

/// Local reflection of the remote auth session, read by every consumer
/// that needs identity or permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncState {
    identity: Option<Identity>,
    session: Option<Session>,
    profile: Option<Profile>,
    loading: bool,
    is_admin: bool,
}

impl SyncState {
    /// State at process start: nothing known yet, first resolution pending.
    #[must_use]
    pub const fn initial() -> Self {
        Self { identity: None, session: None, profile: None, loading: true, is_admin: false }
    }

    /// Canonical logged-out state.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self { identity: None, session: None, profile: None, loading: false, is_admin: false }
    }

    /// Signed-in state; identity is taken from the session.
    #[must_use]
    pub fn signed_in(session: Session, profile: Option<Profile>) -> Self {
        let is_admin = profile.as_ref().is_some_and(Profile::is_admin);
        Self {
            identity: Some(session.identity.clone()),
            session: Some(session),
            profile,
            loading: false,
            is_admin,
        }
    }

    /// Replace only the session, keeping identity and profile.
    ///
    /// Returns `None` when no identity is held or the session belongs to a
    /// different identity; those cases need a full [`SyncState::signed_in`].
    #[must_use]
    pub fn with_refreshed_session(&self, session: Session) -> Option<Self> {
        let held = self.identity.as_ref()?;
        if held.id != session.identity.id {
            return None;
        }
        Some(Self { session: Some(session), loading: false, ..self.clone() })
    }

    /// Replace only the profile (and the derived admin flag).
    ///
    /// Returns `None` when no identity is held.
    #[must_use]
    pub fn with_profile(&self, profile: Option<Profile>) -> Option<Self> {
        self.identity.as_ref()?;
        let is_admin = profile.as_ref().is_some_and(Profile::is_admin);
        Some(Self { profile, is_admin, loading: false, ..self.clone() })
    }

    /// Same state with the first-resolution flag cleared.
    #[must_use]
    pub fn resolved(&self) -> Self {
        Self { loading: false, ..self.clone() }
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn identity_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.id.as_str())
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Route guards redirect to the login page once loading has finished and
    /// nobody is signed in.
    #[must_use]
    pub const fn should_redirect_unauth(&self) -> bool {
        !self.loading && self.identity.is_none()
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::initial()
    }
}
