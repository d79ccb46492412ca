//! # StudyHub Domain
//!
//! Business domain types and models for StudyHub.
//!
//! This crate contains:
//! - Session, identity and profile types mirrored from the hosted backend
//! - The `SyncState` aggregate owned by the session synchronizer
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other StudyHub crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
