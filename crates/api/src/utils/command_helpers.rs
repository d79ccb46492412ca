//! Command execution helpers
//!
//! Keep the command bodies free of timing and logging boilerplate.

use std::future::Future;
use std::time::Instant;

use studyhub_domain::Result as DomainResult;
use tracing::warn;

use crate::utils::logging::log_command_execution;

/// Execute a command, timing it and logging the outcome.
///
/// # Example
///
/// ```rust,ignore
/// execute_logged("session::sign_out", || async { ctx.auth.sign_out().await }).await
/// ```
pub async fn execute_logged<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().map(|_| ()));
    result
}

/// Wait for an interrupt signal such as `tokio::signal::ctrl_c()`.
///
/// A signal that cannot be registered is logged and ends the wait at once.
pub async fn wait_for_interrupt<S>(signal: S)
where
    S: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        warn!(error = %err, "could not listen for interrupt; stopping");
    }
}
