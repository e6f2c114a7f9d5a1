//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for persistence and rate-limit bookkeeping.
//!
//! # Modules
//!
//! - [`store`] - Document store clients (REST and in-memory)
//! - [`ledger`] - TTL key-value ledgers (Redis and in-memory)
//! - [`persistence`] - Repository implementations over the store

pub mod ledger;
pub mod persistence;
pub mod store;
