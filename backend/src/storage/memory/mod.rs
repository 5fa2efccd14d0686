//! # In-Memory Storage Module
//!
//! Mutex-guarded map-based storage backend. The domain layer is storage
//! agnostic; this backend serves the dev server and the test suites, and is
//! the reference for the per-key atomicity the [`crate::storage::traits`]
//! contracts require.

pub mod connection;
pub mod identity_repository;
pub mod log_repository;

pub use connection::MemoryConnection;
pub use identity_repository::IdentityRepository;
pub use log_repository::LogRepository;
