//! Session synchronizer
//!
//! Keeps a local [`SyncState`] consistent with the external auth service
//! across start-up and the asynchronous session-change notifications that
//! follow it.
//!
//! The state lives in a `watch` channel: the synchronizer is its only writer
//! and every write happens inside [`watch::Sender::send_if_modified`], where
//! the liveness and generation checks are made in the same critical section
//! as the replacement. Each transition that fetches a profile takes a new
//! generation before suspending; a result whose generation is no longer
//! current when it resolves is discarded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use studyhub_domain::{Profile, Result, Session, SessionEventKind, SyncState};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::ports::{DynAuthBackend, DynProfileRepository};

/// Reconciles remote session events with the locally held [`SyncState`]
pub struct SessionSynchronizer {
    backend: Arc<DynAuthBackend>,
    profiles: Arc<DynProfileRepository>,
    state: watch::Sender<SyncState>,
    generation: AtomicU64,
    initialized: AtomicBool,
    liveness: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionSynchronizer {
    pub fn new(backend: Arc<DynAuthBackend>, profiles: Arc<DynProfileRepository>) -> Self {
        let (state, _) = watch::channel(SyncState::initial());
        Self {
            backend,
            profiles,
            state,
            generation: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
            liveness: CancellationToken::new(),
            listener: Mutex::new(None),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Change-notifying reader of the state.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// False once [`SessionSynchronizer::shutdown`] has been called.
    pub fn is_live(&self) -> bool {
        !self.liveness.is_cancelled()
    }

    /// Resolve the session held by the external service at start-up.
    ///
    /// Never fails: a session lookup error is logged and treated as signed
    /// out, a profile lookup error as "no profile". `loading` is false when
    /// this returns, even if the result itself was superseded.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("session synchronizer already initialized; ignoring");
            return;
        }

        let generation = self.begin_transition();
        let resolved = match self.backend.current_session().await {
            Ok(Some(session)) => {
                let profile = self.load_profile(session.identity_id()).await;
                Some((session, profile))
            }
            Ok(None) => None,
            Err(err) => {
                error!(error = %err, "failed to read current session; treating as signed out");
                None
            }
        };

        let signed_in = resolved.is_some();
        let committed = self.commit(generation, move |current| {
            Some(match resolved {
                Some((session, profile)) => merge_signed_in(current, session, profile),
                None => SyncState::signed_out(),
            })
        });

        if committed {
            info!(signed_in, "initial session resolved");
        } else {
            debug!(generation, "initial session result superseded; discarding");
        }
        self.finish_loading();
    }

    /// Apply one session-change notification.
    ///
    /// Callers must deliver notifications in emission order; the listener
    /// spawned by [`SessionSynchronizer::start`] does.
    #[instrument(skip(self, session), fields(event = %kind))]
    pub async fn on_session_event(&self, kind: SessionEventKind, session: Option<Session>) {
        if !self.is_live() {
            debug!("synchronizer shut down; ignoring session event");
            return;
        }

        match (kind, session) {
            (SessionEventKind::SignedOut, _) => {
                let generation = self.begin_transition();
                self.commit(generation, |_| Some(SyncState::signed_out()));
                info!("session signed out");
            }
            (SessionEventKind::TokenRefreshed, Some(session)) => {
                if let Some(session) = self.apply_refreshed_session(session) {
                    self.adopt_session(session).await;
                }
            }
            (_, Some(session)) => self.adopt_session(session).await,
            (_, None) => debug!("session event without a session; nothing to apply"),
        }
    }

    /// Re-read the profile row of the held identity.
    ///
    /// No-op when nobody is signed in. The result is dropped if the identity
    /// changed while the fetch was in flight.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) {
        let (generation, identity_id) = {
            let state = self.state.borrow();
            let Some(identity_id) = state.identity_id() else {
                debug!("no identity held; skipping profile refresh");
                return;
            };
            (self.generation.load(Ordering::SeqCst), identity_id.to_owned())
        };

        let profile = self.load_profile(&identity_id).await;
        let committed = self.commit(generation, |current| {
            if current.identity_id() == Some(identity_id.as_str()) {
                current.with_profile(profile)
            } else {
                None
            }
        });

        if !committed {
            debug!(identity_id = %identity_id, "profile refresh superseded; discarding");
        }
    }

    /// Ask the external service to invalidate the session.
    ///
    /// The state is left alone; it converges when the resulting `SIGNED_OUT`
    /// notification arrives.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        self.backend.sign_out().await
    }

    /// Subscribe to the external service and spawn the listener task.
    ///
    /// Calling this again while a listener exists, or after shutdown, does
    /// nothing.
    pub async fn start(self: &Arc<Self>) {
        let mut listener = self.listener.lock().await;
        if listener.is_some() || !self.is_live() {
            debug!("session listener already running or synchronizer shut down");
            return;
        }

        let mut subscription = self.backend.subscribe();
        let synchronizer = Arc::downgrade(self);
        let liveness = self.liveness.clone();

        *listener = Some(tokio::spawn(async move {
            debug!(subscription_id = subscription.id(), "session listener started");
            loop {
                let event = tokio::select! {
                    biased;
                    () = liveness.cancelled() => break,
                    event = subscription.recv() => event,
                };
                let Some(event) = event else {
                    debug!("session event stream closed");
                    break;
                };
                let Some(synchronizer) = synchronizer.upgrade() else {
                    break;
                };

                tokio::select! {
                    biased;
                    () = liveness.cancelled() => break,
                    () = synchronizer.on_session_event(event.kind, event.session) => {}
                }
            }
            subscription.unsubscribe();
            debug!("session listener stopped");
        }));
        info!("session listener running");
    }

    /// Stop reacting to the external service.
    ///
    /// In-flight fetches are not aborted; their results are discarded.
    pub async fn shutdown(&self) {
        self.liveness.cancel();

        let handle = self.listener.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "session listener task ended abnormally");
            }
        }
        info!("session synchronizer shut down");
    }

    fn begin_transition(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Replace the state if the synchronizer is live and `generation` is
    /// still current. Returns false when the result was stale.
    fn commit<F>(&self, generation: u64, transition: F) -> bool
    where
        F: FnOnce(&SyncState) -> Option<SyncState>,
    {
        let mut fresh = false;
        self.state.send_if_modified(|state| {
            if !self.is_live() || !self.is_current(generation) {
                return false;
            }
            let Some(next) = transition(state) else {
                return false;
            };
            fresh = true;
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        fresh
    }

    /// Swap in a refreshed session for the held identity without touching
    /// the profile. Hands the session back when it belongs to someone else.
    fn apply_refreshed_session(&self, session: Session) -> Option<Session> {
        let mut foreign = None;
        self.state.send_if_modified(|state| {
            if !self.is_live() {
                return false;
            }
            if state.identity_id() != Some(session.identity_id()) {
                foreign = Some(session);
                return false;
            }
            if state.session().is_some_and(|held| held.is_newer_than(&session)) {
                debug!("held session is newer than refreshed one; keeping it");
                return false;
            }
            match state.with_refreshed_session(session) {
                Some(next) if next != *state => {
                    *state = next;
                    debug!("session token refreshed");
                    true
                }
                _ => false,
            }
        });
        foreign
    }

    async fn adopt_session(&self, session: Session) {
        let generation = self.begin_transition();
        let identity_id = session.identity_id().to_owned();
        let profile = self.load_profile(&identity_id).await;

        let committed =
            self.commit(generation, move |current| Some(merge_signed_in(current, session, profile)));
        if committed {
            info!(identity_id = %identity_id, "session adopted");
        } else {
            debug!(identity_id = %identity_id, generation, "session result superseded; discarding");
        }
    }

    /// Profile for `identity_id`, with every failure collapsed to "absent".
    async fn load_profile(&self, identity_id: &str) -> Option<Profile> {
        match self.profiles.fetch_by_identity_id(identity_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                debug!(identity_id, "no profile row yet");
                None
            }
            Err(err) if err.is_not_found() => {
                debug!(identity_id, "no profile row yet");
                None
            }
            Err(err) => {
                warn!(identity_id, error = %err, "profile fetch failed; treating as absent");
                None
            }
        }
    }

    fn finish_loading(&self) {
        self.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = state.resolved();
            true
        });
    }
}

impl Drop for SessionSynchronizer {
    fn drop(&mut self) {
        self.liveness.cancel();
    }
}

/// Signed-in state for `session`, keeping the held session when it belongs
/// to the same identity and expires later.
fn merge_signed_in(current: &SyncState, session: Session, profile: Option<Profile>) -> SyncState {
    let session = match current.session() {
        Some(held)
            if held.identity_id() == session.identity_id() && held.is_newer_than(&session) =>
        {
            held.clone()
        }
        _ => session,
    };
    SyncState::signed_in(session, profile)
}
