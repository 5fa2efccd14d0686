//! Storage layer: trait abstractions plus the in-memory backend.

pub mod memory;
pub mod traits;

pub use memory::MemoryConnection;
pub use traits::{IdentityStorage, LogStorage};
