//! Document store access.
//!
//! Provides a [`Store`] trait with two implementations:
//! - [`FirebaseStore`] - REST client for a Realtime-Database-style JSON API
//! - [`MemoryStore`] - in-process JSON tree with the same semantics

mod firebase_store;
mod memory_store;
mod service;

pub use firebase_store::FirebaseStore;
pub use memory_store::MemoryStore;
pub use service::{QueryOptions, Store, StoreError, StoreResult, key_order};

#[cfg(test)]
pub use service::MockStore;
