//! Shared test helpers for `studyhub-core` integration tests.
//!
//! In-memory fakes for the auth backend and the profile table, with call
//! counters and gates that hold a call open until the test releases it.

#![allow(dead_code)]

pub mod backend;
pub mod gate;
pub mod profiles;

use std::time::Duration;

use studyhub_domain::{Identity, Session, SyncState};
use tokio::sync::watch;

pub use backend::FakeAuthBackend;
pub use gate::Gate;
pub use profiles::FakeProfiles;

/// Session for `identity_id` expiring in `expires_in` seconds.
pub fn session_for(identity_id: &str, expires_in: i64) -> Session {
    Session::new(
        format!("jwt-{identity_id}-{expires_in}"),
        Some(format!("rt-{identity_id}")),
        expires_in,
        Identity::new(identity_id, Some(format!("{identity_id}@example.com"))),
    )
}

/// Wait until the watched state satisfies `predicate`, failing after 2s.
pub async fn wait_for_state(
    receiver: &mut watch::Receiver<SyncState>,
    predicate: impl FnMut(&SyncState) -> bool,
) -> SyncState {
    let state = tokio::time::timeout(Duration::from_secs(2), receiver.wait_for(predicate))
        .await
        .expect("timed out waiting for sync state")
        .expect("sync state channel closed");
    state.clone()
}
