//! # StudyHub App
//!
//! Command-line application layer - commands and main entry point.
//!
//! This crate contains:
//! - Commands (terminal → auth services bridge)
//! - Application context (dependency injection)
//! - Logging bootstrap
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Provides the `studyhub` binary

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::{execute, Command, CommandOutput, StatusReport};
pub use context::AppContext;
