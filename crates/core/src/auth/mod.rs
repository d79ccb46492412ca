//! Authentication session synchronization
//!
//! - [`ports`]: traits the infrastructure implements
//! - [`events`]: in-process session event fan-out
//! - [`synchronizer`]: local reflection of the remote session
//! - [`service`]: user-initiated auth operations

pub mod events;
pub mod ports;
pub mod service;
pub mod synchronizer;

pub use events::{SessionEventHub, SessionSubscription};
pub use ports::{
    AuthBackend, DynAuthBackend, DynProfileRepository, DynSessionStorage, ProfileRepository,
    SessionStorage,
};
pub use service::AuthService;
pub use synchronizer::SessionSynchronizer;
