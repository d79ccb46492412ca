//! # StudyHub Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client with retry and the hosted backend adapters (auth + REST)
//! - Session persistence (file-backed and in-memory)
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `studyhub-core`
//! - Depends on `studyhub-domain` and `studyhub-core`
//! - Contains all "impure" code (network and file I/O)

pub mod backend;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use backend::{
    AccessTokenProvider, AuthApi, RemoteAuthBackend, RestProfileRepository, SignUpOutcome,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use storage::{FileSessionStorage, MemorySessionStorage};
