//! In-memory `ProfileRepository` fake.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use studyhub_core::ProfileRepository;
use studyhub_domain::{Profile, ProfileChanges, Result, StudyHubError};

use super::gate::Gate;

/// Profile table keyed by identity id, with per-id scripted failures.
#[derive(Default)]
pub struct FakeProfiles {
    rows: Mutex<HashMap<String, Result<Option<Profile>>>>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
    fetches: AtomicUsize,
    updates: Mutex<Vec<(String, ProfileChanges)>>,
}

impl FakeProfiles {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_profile(self: Arc<Self>, profile: Profile) -> Arc<Self> {
        self.set_profile(profile);
        self
    }

    pub fn set_profile(&self, profile: Profile) {
        self.rows.lock().insert(profile.id.clone(), Ok(Some(profile)));
    }

    /// Make fetches for `identity_id` fail with `error`.
    pub fn fail_for(&self, identity_id: &str, error: StudyHubError) {
        self.rows.lock().insert(identity_id.to_owned(), Err(error));
    }

    /// Hold the next fetch for `identity_id` at a gate.
    pub fn hold_fetch(&self, identity_id: &str) -> Arc<Gate> {
        let gate = Gate::closed();
        self.gates.lock().insert(identity_id.to_owned(), Arc::clone(&gate));
        gate
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<(String, ProfileChanges)> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl ProfileRepository for FakeProfiles {
    async fn fetch_by_identity_id(&self, identity_id: &str) -> Result<Option<Profile>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().remove(identity_id);
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.rows.lock().get(identity_id).cloned().unwrap_or(Ok(None))
    }

    async fn update(&self, identity_id: &str, changes: &ProfileChanges) -> Result<Profile> {
        self.updates.lock().push((identity_id.to_owned(), changes.clone()));

        let mut rows = self.rows.lock();
        let Some(Ok(Some(existing))) = rows.get(identity_id).cloned() else {
            return Err(StudyHubError::NotFound(format!("profile {identity_id}")));
        };
        let mut updated = existing;
        if let Some(username) = &changes.username {
            updated.username.clone_from(username);
        }
        if let Some(avatar_url) = &changes.avatar_url {
            updated.avatar_url = Some(avatar_url.clone());
        }
        rows.insert(identity_id.to_owned(), Ok(Some(updated.clone())));
        Ok(updated)
    }
}
