//! Session commands: status, sign-in, sign-up, sign-out and watch
//!
//! Auth calls only trigger backend events; the synchronized state catches up
//! asynchronously, so each mutating command waits for the state it expects
//! before reporting.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use studyhub_domain::{Result as DomainResult, StudyHubError, SyncState};
use tracing::debug;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

/// How long a command waits for the synchronized state to settle.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// User-facing snapshot of the synchronized auth state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub signed_in: bool,
    pub loading: bool,
    pub identity_id: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub is_admin: bool,
}

impl From<&SyncState> for StatusReport {
    fn from(state: &SyncState) -> Self {
        Self {
            signed_in: state.is_signed_in(),
            loading: state.is_loading(),
            identity_id: state.identity_id().map(str::to_owned),
            email: state.identity().and_then(|identity| identity.email.clone()),
            username: state.profile().map(|profile| profile.username.clone()),
            is_admin: state.is_admin(),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loading {
            return f.write_str("loading");
        }
        let Some(id) = self.identity_id.as_deref() else {
            return f.write_str("signed out");
        };

        write!(f, "signed in as {}", self.email.as_deref().unwrap_or(id))?;
        match self.username.as_deref() {
            Some(username) => write!(f, " ({username})")?,
            None => f.write_str(" (no profile yet)")?,
        }
        if self.is_admin {
            f.write_str(" [admin]")?;
        }
        Ok(())
    }
}

/// Report the current synchronized state.
pub fn status(ctx: &AppContext) -> StatusReport {
    StatusReport::from(&ctx.state())
}

/// Sign in and wait until the synchronizer reflects the new identity.
pub async fn sign_in(ctx: &AppContext, email: &str, password: &str) -> DomainResult<StatusReport> {
    execute_logged("session::sign_in", move || async move {
        let session = ctx.auth.sign_in(email, password).await?;
        let identity_id = session.identity_id().to_owned();
        let state = settle(ctx, |state| state.identity_id() == Some(identity_id.as_str())).await?;
        Ok(StatusReport::from(&state))
    })
    .await
}

/// Register an account.
///
/// Projects that auto-confirm sign the new user in right away; otherwise a
/// confirmation email is pending and the state stays as it was.
pub async fn sign_up(
    ctx: &AppContext,
    email: &str,
    password: &str,
    username: &str,
) -> DomainResult<String> {
    execute_logged("session::sign_up", move || async move {
        let identity = ctx.auth.sign_up(email, password, username).await?;

        let signed_in =
            ctx.backend.session().is_some_and(|session| session.identity_id() == identity.id);
        if !signed_in {
            return Ok(format!(
                "account {} created; confirm your email address before signing in",
                identity.email.as_deref().unwrap_or(&identity.id)
            ));
        }

        let state = settle(ctx, |state| state.identity_id() == Some(identity.id.as_str())).await?;
        Ok(format!("account created; {}", StatusReport::from(&state)))
    })
    .await
}

/// Sign out and wait until the synchronizer has dropped the identity.
pub async fn sign_out(ctx: &AppContext) -> DomainResult<StatusReport> {
    execute_logged("session::sign_out", move || async move {
        ctx.auth.sign_out().await?;
        let state = settle(ctx, |state| !state.is_signed_in()).await?;
        Ok(StatusReport::from(&state))
    })
    .await
}

/// Report every state change until `stop` resolves.
///
/// The current state is reported first.
pub async fn watch<S, F>(ctx: &AppContext, stop: S, mut on_change: F)
where
    S: Future<Output = ()>,
    F: FnMut(&StatusReport),
{
    let mut receiver = ctx.auth.synchronizer().subscribe();
    on_change(&StatusReport::from(&*receiver.borrow_and_update()));

    tokio::pin!(stop);
    loop {
        tokio::select! {
            () = &mut stop => break,
            changed = receiver.changed() => {
                if changed.is_err() {
                    debug!("state channel closed; stopping watch");
                    break;
                }
                let report = StatusReport::from(&*receiver.borrow_and_update());
                on_change(&report);
            }
        }
    }
}

/// Wait until the state is settled (not loading) and satisfies `predicate`.
async fn settle<P>(ctx: &AppContext, predicate: P) -> DomainResult<SyncState>
where
    P: Fn(&SyncState) -> bool,
{
    let mut receiver = ctx.auth.synchronizer().subscribe();
    let waited = tokio::time::timeout(
        SETTLE_TIMEOUT,
        receiver.wait_for(|state| !state.is_loading() && predicate(state)),
    )
    .await;

    match waited {
        Ok(Ok(state)) => Ok(state.clone()),
        Ok(Err(_)) => Err(StudyHubError::Internal("auth state channel closed".into())),
        Err(_) => Err(StudyHubError::Network(format!(
            "auth state did not settle within {}s",
            SETTLE_TIMEOUT.as_secs()
        ))),
    }
}
