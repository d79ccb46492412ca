//! In-memory `AuthBackend` fake.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use studyhub_core::{AuthBackend, SessionEventHub, SessionSubscription};
use studyhub_domain::{Identity, Result, Session, SessionEvent, SignUpAttributes, StudyHubError};

use super::gate::Gate;

/// Scriptable auth backend publishing through a real [`SessionEventHub`].
#[derive(Default)]
pub struct FakeAuthBackend {
    hub: SessionEventHub,
    current: Mutex<Option<Result<Option<Session>>>>,
    current_gate: Mutex<Option<Arc<Gate>>>,
    accounts: Mutex<HashMap<String, (String, Session)>>,
    registrations: Mutex<Vec<(String, SignUpAttributes)>>,
    current_session_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl FakeAuthBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Session returned by `current_session`.
    pub fn with_current_session(self: Arc<Self>, result: Result<Option<Session>>) -> Arc<Self> {
        *self.current.lock() = Some(result);
        self
    }

    /// Account accepted by `sign_in_with_password`.
    pub fn with_account(
        self: Arc<Self>,
        email: &str,
        password: &str,
        session: Session,
    ) -> Arc<Self> {
        self.accounts.lock().insert(email.to_owned(), (password.to_owned(), session));
        self
    }

    /// Hold the next `current_session` call at a gate.
    pub fn hold_current_session(&self) -> Arc<Gate> {
        let gate = Gate::closed();
        *self.current_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Publish `event` as if the remote service emitted it.
    pub fn emit(&self, event: SessionEvent) -> usize {
        self.hub.publish(&event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    pub fn current_session_calls(&self) -> usize {
        self.current_session_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn registrations(&self) -> Vec<(String, SignUpAttributes)> {
        self.registrations.lock().clone()
    }
}

#[async_trait]
impl AuthBackend for FakeAuthBackend {
    async fn current_session(&self) -> Result<Option<Session>> {
        self.current_session_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.current_gate.lock().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.current.lock().clone().unwrap_or(Ok(None))
    }

    fn subscribe(&self) -> SessionSubscription {
        self.hub.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let account = self.accounts.lock().get(email).cloned();
        match account {
            Some((expected, session)) if expected == password => {
                self.hub.publish(&SessionEvent::signed_in(session.clone()));
                Ok(session)
            }
            _ => Err(StudyHubError::Auth("Invalid login credentials".into())),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        attributes: &SignUpAttributes,
    ) -> Result<Identity> {
        self.registrations.lock().push((email.to_owned(), attributes.clone()));
        Ok(Identity::new(format!("id-{email}"), Some(email.to_owned())))
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.hub.publish(&SessionEvent::signed_out());
        Ok(())
    }
}
