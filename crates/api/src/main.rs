//! StudyHub - session synchronization client
//!
//! Main entry point for the command-line application.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use studyhub_lib::commands::{self, Cli, Command};
use studyhub_lib::utils::command_helpers::wait_for_interrupt;
use studyhub_lib::utils::logging::init_tracing;
use studyhub_lib::AppContext;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the config so STUDYHUB_* variables from it apply
    let dotenv = dotenvy::dotenv();

    let command = Cli::parse().into_command();

    let config = studyhub_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to initialize logging")?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => debug!(error = %err, "no .env file loaded"),
    }

    let ctx = AppContext::new_with_config(config).context("failed to build application context")?;
    ctx.start().await;

    let result = run(&ctx, &command).await;
    ctx.shutdown().await;
    result
}

#[allow(clippy::print_stdout)]
async fn run(ctx: &AppContext, command: &Command) -> anyhow::Result<()> {
    if matches!(command, Command::Watch) {
        let stop = wait_for_interrupt(tokio::signal::ctrl_c());
        commands::watch(ctx, stop, |report| {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{report}");
        })
        .await;
        return Ok(());
    }

    let json = matches!(command, Command::Status { json: true });
    let output = commands::execute(ctx, command).await?;
    println!("{}", output.render(json)?);
    Ok(())
}
