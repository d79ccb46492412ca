use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use studyhub_core::{DynSessionStorage, SessionSubscription};
use studyhub_domain::{BackendConfig, Identity, Session, SessionEvent};
use studyhub_infra::backend::{AuthApi, RemoteAuthBackend};
use studyhub_infra::http::HttpClient;
use studyhub_infra::storage::MemorySessionStorage;
use wiremock::MockServer;

pub const ANON_KEY: &str = "anon-test-key";
pub const REFRESH_THRESHOLD: i64 = 300;

/// Backend config pointing at the mock server, single attempt per request.
pub fn backend_config(server: &MockServer) -> BackendConfig {
    let mut config = BackendConfig::new(server.uri(), ANON_KEY);
    config.max_attempts = 1;
    config.request_timeout_secs = 5;
    config
}

pub fn http_client(config: &BackendConfig) -> HttpClient {
    HttpClient::for_backend(config).expect("http client should build")
}

/// Remote backend over the mock server with the given storage.
pub fn remote_backend(
    server: &MockServer,
    storage: Arc<DynSessionStorage>,
) -> Arc<RemoteAuthBackend> {
    let config = backend_config(server);
    let api = AuthApi::new(http_client(&config), &config);
    Arc::new(RemoteAuthBackend::new(api, storage, REFRESH_THRESHOLD))
}

pub fn memory_storage() -> Arc<DynSessionStorage> {
    Arc::new(MemorySessionStorage::new())
}

/// Token grant body as returned by `/auth/v1/token`.
pub fn token_body(identity_id: &str, access_token: &str, refresh_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": Utc::now().timestamp() + 3600,
        "user": {
            "id": identity_id,
            "email": format!("{identity_id}@example.com"),
            "role": "authenticated"
        }
    })
}

pub fn session(identity_id: &str, access_token: &str, expires_in: i64) -> Session {
    Session::new(
        access_token.to_string(),
        Some(format!("refresh-{access_token}")),
        expires_in,
        Identity::new(identity_id, Some(format!("{identity_id}@example.com"))),
    )
}

/// Session whose access token expired ten seconds ago.
pub fn expired_session(identity_id: &str, access_token: &str) -> Session {
    let mut session = session(identity_id, access_token, 3600);
    session.expires_at = Some(Utc::now() - chrono::Duration::seconds(10));
    session
}

/// Next event on `subscription`, failing the test after two seconds.
pub async fn next_event(subscription: &mut SessionSubscription) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), subscription.recv())
        .await
        .expect("event should arrive in time")
        .expect("hub should still be open")
}
