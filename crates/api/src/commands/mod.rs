//! Command-line commands - parsing and dispatch

pub mod profile;
pub mod session;

use std::fmt;

use clap::{Parser, Subcommand};
use studyhub_domain::{Result as DomainResult, StudyHubError};

pub use profile::set_username;
pub use session::{sign_in, sign_out, sign_up, status, watch, StatusReport};

use crate::context::AppContext;

/// StudyHub command line.
#[derive(Parser, Debug)]
#[command(name = "studyhub", version, about = "StudyHub session client")]
pub struct Cli {
    /// Command to run; `status` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The command to run, defaulting to a plain `status`.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Status { json: false })
    }
}

/// A parsed subcommand.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the synchronized auth state
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign in with email and password
    SignIn {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Register a new account
    SignUp {
        /// Email to register
        email: String,
        /// Password, at least six characters
        password: String,
        /// Public username for the new profile
        username: String,
    },
    /// Sign out and forget the session
    SignOut,
    /// Rename the signed-in user's profile
    SetUsername {
        /// New username
        username: String,
    },
    /// Print every state change until Ctrl-C
    Watch,
}

/// What a one-shot command reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Status(StatusReport),
    Message(String),
}

impl CommandOutput {
    /// Render for the terminal; `json` only affects status reports.
    ///
    /// # Errors
    /// Returns `StudyHubError::Serialization` if the report cannot be encoded.
    pub fn render(&self, json: bool) -> DomainResult<String> {
        match self {
            Self::Status(report) if json => serde_json::to_string_pretty(report)
                .map_err(|e| StudyHubError::Serialization(e.to_string())),
            other => Ok(other.to_string()),
        }
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(report) => fmt::Display::fmt(report, f),
            Self::Message(message) => f.write_str(message),
        }
    }
}

/// Run a one-shot command against a started context.
///
/// `watch` is long-running and is driven by the caller through
/// [`session::watch`]; passing it here only reports the current state.
pub async fn execute(ctx: &AppContext, command: &Command) -> DomainResult<CommandOutput> {
    match command {
        Command::Status { .. } | Command::Watch => Ok(CommandOutput::Status(status(ctx))),
        Command::SignIn { email, password } => {
            sign_in(ctx, email, password).await.map(CommandOutput::Status)
        }
        Command::SignUp { email, password, username } => {
            sign_up(ctx, email, password, username).await.map(CommandOutput::Message)
        }
        Command::SignOut => sign_out(ctx).await.map(CommandOutput::Status),
        Command::SetUsername { username } => {
            set_username(ctx, username).await.map(CommandOutput::Status)
        }
    }
}
