//! Application context - dependency injection container

use std::sync::Arc;

use studyhub_core::{AuthService, DynProfileRepository, DynSessionStorage};
use studyhub_domain::{Config, Result, SyncState};
use studyhub_infra::{
    AuthApi, FileSessionStorage, HttpClient, MemorySessionStorage, RemoteAuthBackend,
    RestProfileRepository,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub backend: Arc<RemoteAuthBackend>,
    refresh_cancel: CancellationToken,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire every service from an already-loaded configuration.
    ///
    /// Nothing is started; call [`AppContext::start`] once the async runtime
    /// is available.
    pub fn new_with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::for_backend(&config.backend)?;
        let api = AuthApi::new(http.clone(), &config.backend);

        let storage: Arc<DynSessionStorage> = if config.session.persist {
            let path = config.session.storage_path();
            debug!(path = %path.display(), "session persistence enabled");
            Arc::new(FileSessionStorage::new(path))
        } else {
            Arc::new(MemorySessionStorage::new())
        };

        let backend = Arc::new(RemoteAuthBackend::new(
            api,
            storage,
            config.session.refresh_threshold_seconds,
        ));
        let profiles: Arc<DynProfileRepository> = Arc::new(RestProfileRepository::new(
            http,
            &config.backend,
            backend.clone(),
        ));
        let auth = Arc::new(AuthService::new(backend.clone(), profiles));

        Ok(Self {
            config,
            auth,
            backend,
            refresh_cancel: CancellationToken::new(),
            refresh_task: Mutex::new(None),
        })
    }

    /// Start the session synchronizer and, when enabled, background token
    /// refresh. Returns once the initial session has been resolved.
    pub async fn start(&self) {
        self.auth.start().await;

        if self.config.session.auto_refresh {
            let mut guard = self.refresh_task.lock().await;
            if guard.is_none() {
                *guard = Some(self.backend.start_auto_refresh(self.refresh_cancel.child_token()));
            }
        }

        info!(signed_in = self.state().is_signed_in(), "application context started");
    }

    /// Current synchronized auth state.
    pub fn state(&self) -> SyncState {
        self.auth.state()
    }

    /// Stop background work and detach from session events.
    pub async fn shutdown(&self) {
        self.refresh_cancel.cancel();
        if let Some(handle) = self.refresh_task.lock().await.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "auto-refresh task ended abnormally");
            }
        }
        self.auth.shutdown().await;
        info!("application context shut down");
    }
}
