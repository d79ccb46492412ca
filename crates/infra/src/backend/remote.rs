//! Stateful auth backend over the hosted service
//!
//! Holds the current session and persists it through a
//! [`SessionStorage`](studyhub_core::SessionStorage) port. Every transition
//! is published on a [`SessionEventHub`]; the access token can optionally be
//! refreshed in the background before it expires.
//!
//! Session mutations are serialized by an async mutex so a refresh can never
//! resurrect a session that a concurrent sign-out just cleared.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use studyhub_core::{AuthBackend, DynSessionStorage, SessionEventHub, SessionSubscription};
use studyhub_domain::constants::{
    AUTO_REFRESH_IDLE_RECHECK_SECS, AUTO_REFRESH_MIN_INTERVAL_SECS, AUTO_REFRESH_RETRY_SECS,
};
use studyhub_domain::{
    Identity, Result, Session, SessionEvent, SessionEventKind, SignUpAttributes, StudyHubError,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::auth_api::{AuthApi, SignUpOutcome};
use super::AccessTokenProvider;

/// [`AuthBackend`] implementation for the hosted auth service.
pub struct RemoteAuthBackend {
    api: AuthApi,
    storage: Arc<DynSessionStorage>,
    hub: SessionEventHub,
    current: RwLock<Option<Session>>,
    transition: Mutex<()>,
    refresh_threshold_seconds: i64,
}

impl RemoteAuthBackend {
    pub fn new(
        api: AuthApi,
        storage: Arc<DynSessionStorage>,
        refresh_threshold_seconds: i64,
    ) -> Self {
        Self {
            api,
            storage,
            hub: SessionEventHub::new(),
            current: RwLock::new(None),
            transition: Mutex::new(()),
            refresh_threshold_seconds,
        }
    }

    /// Session currently held in memory.
    pub fn session(&self) -> Option<Session> {
        self.current.read().clone()
    }

    /// Exchange the held refresh token for a new session.
    ///
    /// Returns `Ok(None)` when nothing is held or the service rejected the
    /// refresh token; in the latter case the session is discarded and
    /// `SIGNED_OUT` is published. Transport failures leave the session alone.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<Option<Session>> {
        let _transition = self.transition.lock().await;
        let Some(held) = self.session() else {
            return Ok(None);
        };
        self.refresh_held(&held).await
    }

    /// Spawn the background refresh loop.
    ///
    /// The loop sleeps until `refresh_threshold_seconds` before expiry,
    /// refreshes, and repeats; it re-checks every minute while signed out
    /// and stops when `cancel` fires. Tokens that live no longer than the
    /// threshold are renewed at a bounded pace rather than back to back.
    pub fn start_auto_refresh(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let backend = Arc::clone(self);
        let retry_after = Duration::from_secs(AUTO_REFRESH_RETRY_SECS);
        tokio::spawn(async move {
            info!("token auto-refresh started");
            let mut just_refreshed = false;
            loop {
                let wake = backend.next_refresh_in(just_refreshed);
                if !wake.is_zero() {
                    debug!(seconds = wake.as_secs(), "auto-refresh sleeping");
                }
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(wake) => {}
                }

                let due = backend
                    .session()
                    .is_some_and(|session| session.is_expired(backend.refresh_threshold_seconds));
                if !due {
                    just_refreshed = false;
                    continue;
                }

                info!("access token expiring soon; refreshing");
                match backend.refresh_session().await {
                    Ok(_) => just_refreshed = true,
                    Err(err) => {
                        just_refreshed = false;
                        error!(error = %err, "auto-refresh failed; retrying later");
                        tokio::select! {
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(retry_after) => {}
                        }
                    }
                }
            }
            info!("token auto-refresh stopped");
        })
    }

    fn next_refresh_in(&self, just_refreshed: bool) -> Duration {
        let Some(seconds_until_expiry) =
            self.current.read().as_ref().and_then(Session::seconds_until_expiry)
        else {
            return Duration::from_secs(AUTO_REFRESH_IDLE_RECHECK_SECS);
        };
        refresh_delay(seconds_until_expiry, self.refresh_threshold_seconds, just_refreshed)
    }

    /// Refresh `held`; caller holds the transition lock.
    async fn refresh_held(&self, held: &Session) -> Result<Option<Session>> {
        let Some(refresh_token) = held.refresh_token.as_deref() else {
            warn!("session has no refresh token; discarding it");
            self.discard().await;
            return Ok(None);
        };

        match self.api.refresh_session(refresh_token).await {
            Ok(session) => {
                self.adopt(session.clone(), SessionEventKind::TokenRefreshed).await;
                Ok(Some(session))
            }
            Err(StudyHubError::Auth(reason)) => {
                warn!(%reason, "refresh token rejected; signing out");
                self.discard().await;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Hold, persist and announce `session`; caller holds the transition lock.
    async fn adopt(&self, session: Session, kind: SessionEventKind) {
        *self.current.write() = Some(session.clone());
        if let Err(err) = self.storage.store(&session).await {
            warn!(error = %err, "failed to persist session");
        }
        self.hub.publish(&SessionEvent::new(kind, Some(session)));
    }

    /// Forget the session everywhere and announce it; caller holds the
    /// transition lock.
    async fn discard(&self) {
        self.current.write().take();
        if let Err(err) = self.storage.clear().await {
            warn!(error = %err, "failed to clear persisted session");
        }
        self.hub.publish(&SessionEvent::signed_out());
    }
}

/// How long to wait before refreshing a session that expires in
/// `seconds_until_expiry`.
///
/// A session already inside the threshold is refreshed at once, unless it was
/// just issued: its lifetime is shorter than the threshold, so it waits half
/// of what is left, capped at [`AUTO_REFRESH_MIN_INTERVAL_SECS`] and never
/// less than a second.
fn refresh_delay(seconds_until_expiry: i64, threshold: i64, just_refreshed: bool) -> Duration {
    let seconds_until_refresh = seconds_until_expiry - threshold;
    if seconds_until_refresh > 0 {
        return u64::try_from(seconds_until_refresh).map_or(Duration::ZERO, Duration::from_secs);
    }
    if !just_refreshed {
        return Duration::ZERO;
    }
    let pause = (seconds_until_expiry / 2).clamp(1, AUTO_REFRESH_MIN_INTERVAL_SECS);
    u64::try_from(pause).map_or(Duration::ZERO, Duration::from_secs)
}

impl AccessTokenProvider for RemoteAuthBackend {
    fn access_token(&self) -> Option<String> {
        self.current.read().as_ref().map(|session| session.access_token.clone())
    }
}

#[async_trait]
impl AuthBackend for RemoteAuthBackend {
    #[instrument(skip(self))]
    async fn current_session(&self) -> Result<Option<Session>> {
        let _transition = self.transition.lock().await;

        let session = match self.session() {
            Some(session) => Some(session),
            None => match self.storage.retrieve().await {
                Ok(persisted) => persisted,
                Err(err) => {
                    warn!(error = %err, "persisted session unreadable; ignoring it");
                    if let Err(err) = self.storage.clear().await {
                        warn!(error = %err, "failed to clear persisted session");
                    }
                    None
                }
            },
        };
        let Some(session) = session else {
            return Ok(None);
        };

        if !session.is_expired(0) {
            *self.current.write() = Some(session.clone());
            return Ok(Some(session));
        }

        debug!(identity_id = %session.identity_id(), "held session expired; refreshing");
        self.refresh_held(&session).await
    }

    fn subscribe(&self) -> SessionSubscription {
        self.hub.subscribe()
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let _transition = self.transition.lock().await;
        let session = self.api.sign_in_with_password(email, password).await?;
        self.adopt(session.clone(), SessionEventKind::SignedIn).await;
        Ok(session)
    }

    #[instrument(skip(self, password, attributes))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &SignUpAttributes,
    ) -> Result<Identity> {
        match self.api.sign_up(email, password, attributes).await? {
            SignUpOutcome::SignedIn(session) => {
                let _transition = self.transition.lock().await;
                let identity = session.identity.clone();
                self.adopt(session, SessionEventKind::SignedIn).await;
                Ok(identity)
            }
            SignUpOutcome::ConfirmationPending(identity) => {
                info!(identity_id = %identity.id, "signup awaiting email confirmation");
                Ok(identity)
            }
        }
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        if let Some(token) = self.access_token() {
            if let Err(err) = self.api.sign_out(&token).await {
                warn!(error = %err, "remote sign-out failed; clearing local session anyway");
            }
        }
        self.discard().await;
        Ok(())
    }
}
