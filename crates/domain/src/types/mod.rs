//! Domain types and models

pub mod auth;
pub mod profile;
pub mod sync_state;

pub use auth::{Identity, Session, SessionEvent, SessionEventKind, SignUpAttributes};
pub use profile::{Profile, ProfileChanges};
pub use sync_state::SyncState;
