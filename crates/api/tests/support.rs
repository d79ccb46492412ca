#![allow(dead_code)]

use chrono::Utc;
use serde_json::{json, Value};
use studyhub_domain::{BackendConfig, Config, LoggingConfig, SessionConfig};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ANON_KEY: &str = "anon-test-key";
pub const PASSWORD: &str = "hunter22";

/// Config pointing at the mock server with the session file inside `dir`.
///
/// Background refresh is off unless a test turns it on.
pub fn test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut backend = BackendConfig::new(server.uri(), ANON_KEY);
    backend.max_attempts = 1;
    backend.request_timeout_secs = 5;

    Config {
        backend,
        session: SessionConfig {
            persist: true,
            storage_path: Some(dir.path().join("session.json").to_string_lossy().into_owned()),
            auto_refresh: false,
            ..SessionConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}

pub fn token_body(identity_id: &str, access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": format!("refresh-{access_token}"),
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": Utc::now().timestamp() + 3600,
        "user": { "id": identity_id, "email": format!("{identity_id}@example.com") }
    })
}

/// Accept `PASSWORD` for `<identity_id>@example.com`, reject anything else.
pub async fn mount_password_grant(server: &MockServer, identity_id: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_partial_json(json!({
            "email": format!("{identity_id}@example.com"),
            "password": PASSWORD
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(identity_id, "jwt-1")))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(server)
        .await;
}

pub async fn mount_profile(server: &MockServer, identity_id: &str, username: &str, admin: bool) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{identity_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": identity_id,
            "username": username,
            "is_admin": admin
        })))
        .mount(server)
        .await;
}

pub async fn mount_missing_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "The result contains 0 rows",
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(server)
        .await;
}

pub async fn mount_logout(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}
