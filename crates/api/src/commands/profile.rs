//! Profile commands

use studyhub_domain::{ProfileChanges, Result as DomainResult};

use super::session::StatusReport;
use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

/// Rename the signed-in user's profile and report the refreshed state.
pub async fn set_username(ctx: &AppContext, username: &str) -> DomainResult<StatusReport> {
    execute_logged("profile::set_username", move || async move {
        let changes = ProfileChanges { username: Some(username.to_owned()), avatar_url: None };
        ctx.auth.update_profile(changes).await?;
        Ok(StatusReport::from(&ctx.state()))
    })
    .await
}
