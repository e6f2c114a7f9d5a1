//! Ephemeral key-value storage for rate-limit bookkeeping.
//!
//! Provides [`QuotaLedger`] and [`PacingCache`] traits with two implementations:
//! - [`RedisLedger`] - production Redis-backed ledger
//! - [`MemoryLedger`] - in-process fallback for single-instance runs and tests

mod memory_ledger;
mod redis_ledger;
mod service;

pub use memory_ledger::MemoryLedger;
pub use redis_ledger::RedisLedger;
pub use service::{LedgerError, LedgerResult, PacingCache, QuotaLedger};

#[cfg(test)]
pub use service::{MockPacingCache, MockQuotaLedger};
