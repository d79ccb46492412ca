//! # StudyHub Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the hosted auth backend
//! - The in-process session event hub
//! - The session synchronizer and the auth service built on it
//!
//! ## Architecture Principles
//! - Only depends on `studyhub-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;

pub use auth::events::{SessionEventHub, SessionSubscription};
pub use auth::ports::{
    AuthBackend, DynAuthBackend, DynProfileRepository, DynSessionStorage, ProfileRepository,
    SessionStorage,
};
pub use auth::service::AuthService;
pub use auth::synchronizer::SessionSynchronizer;
