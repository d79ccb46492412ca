//! Authentication service - orchestrates sign-in, registration and profile
//! edits on top of the session synchronizer

use std::sync::Arc;

use studyhub_domain::constants::MIN_PASSWORD_LENGTH;
use studyhub_domain::{
    Identity, Profile, ProfileChanges, Result, Session, SignUpAttributes, StudyHubError, SyncState,
};
use tracing::{info, instrument};

use super::ports::{DynAuthBackend, DynProfileRepository};
use super::synchronizer::SessionSynchronizer;

/// Front-end facing authentication operations.
///
/// State changes caused by these calls are not applied directly; they arrive
/// through the session event stream and the synchronizer.
pub struct AuthService {
    synchronizer: Arc<SessionSynchronizer>,
    backend: Arc<DynAuthBackend>,
    profiles: Arc<DynProfileRepository>,
}

impl AuthService {
    pub fn new(backend: Arc<DynAuthBackend>, profiles: Arc<DynProfileRepository>) -> Self {
        let synchronizer =
            Arc::new(SessionSynchronizer::new(Arc::clone(&backend), Arc::clone(&profiles)));
        Self { synchronizer, backend, profiles }
    }

    pub fn synchronizer(&self) -> &Arc<SessionSynchronizer> {
        &self.synchronizer
    }

    pub fn state(&self) -> SyncState {
        self.synchronizer.state()
    }

    /// Start listening for session events, then resolve the initial session.
    pub async fn start(&self) {
        self.synchronizer.start().await;
        self.synchronizer.initialize().await;
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(StudyHubError::InvalidInput("email and password are required".into()));
        }

        let session = self.backend.sign_in_with_password(email, password).await?;
        info!(identity_id = %session.identity_id(), "signed in");
        Ok(session)
    }

    /// Register a new account. The backend creates the profile row from the
    /// `username` attribute.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str, username: &str) -> Result<Identity> {
        let email = email.trim();
        let username = username.trim();
        if !email.contains('@') {
            return Err(StudyHubError::InvalidInput(format!("'{email}' is not an email address")));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StudyHubError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if username.is_empty() {
            return Err(StudyHubError::InvalidInput("username is required".into()));
        }

        let attributes = SignUpAttributes { username: username.to_owned() };
        let identity = self.backend.sign_up(email, password, &attributes).await?;
        info!(identity_id = %identity.id, "registered");
        Ok(identity)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.synchronizer.sign_out().await
    }

    /// Patch the signed-in identity's own profile row and reflect it locally.
    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, changes: ProfileChanges) -> Result<Profile> {
        let identity_id = self
            .state()
            .identity_id()
            .map(str::to_owned)
            .ok_or_else(|| StudyHubError::Auth("not signed in".into()))?;

        if changes.is_empty() {
            return Err(StudyHubError::InvalidInput("no profile changes given".into()));
        }
        if changes.username.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(StudyHubError::InvalidInput("username must not be empty".into()));
        }

        let profile = self.profiles.update(&identity_id, &changes).await?;
        self.synchronizer.refresh_profile().await;
        info!(identity_id = %identity_id, "profile updated");
        Ok(profile)
    }

    pub async fn shutdown(&self) {
        self.synchronizer.shutdown().await;
    }
}
