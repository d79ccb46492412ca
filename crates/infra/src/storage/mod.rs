//! Session storage adapters
//!
//! - [`FileSessionStorage`]: JSON file, written atomically
//! - [`MemorySessionStorage`]: process-local, used when persistence is off

pub mod file;
pub mod memory;

pub use file::FileSessionStorage;
pub use memory::MemorySessionStorage;
