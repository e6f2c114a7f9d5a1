//! Ledger traits and error types.

use async_trait::async_trait;

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger call timed out")]
    Timeout,

    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ephemeral string store with per-key expiry, used for quota bookkeeping.
///
/// Once a key's TTL elapses it reads as absent.
///
/// # Implementations
///
/// - [`crate::infrastructure::ledger::RedisLedger`] - Redis `GET` / `SET EX`
/// - [`crate::infrastructure::ledger::MemoryLedger`] - in-process map with clock-driven expiry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotaLedger: Send + Sync {
    /// Reads the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on timeout or backend failure. A failed read
    /// is never reported as absent.
    async fn get(&self, key: &str) -> LedgerResult<Option<String>>;

    /// Stores `value` at `key`, expiring after `ttl_seconds`.
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> LedgerResult<()>;
}

/// Presence-only denylist with per-key expiry, used for request pacing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PacingCache: Send + Sync {
    /// Returns true if a live marker exists at `key`.
    async fn exists(&self, key: &str) -> LedgerResult<bool>;

    /// Places a marker at `key` for `ttl_seconds`.
    async fn set(&self, key: &str, ttl_seconds: u64) -> LedgerResult<()>;

    /// Places a marker only if none is live. Returns true if this call placed it.
    ///
    /// The default runs [`PacingCache::exists`] then [`PacingCache::set`]; two
    /// racing callers may both succeed. Backends with a conditional write
    /// override this with a single atomic call.
    async fn set_if_absent(&self, key: &str, ttl_seconds: u64) -> LedgerResult<bool> {
        if self.exists(key).await? {
            return Ok(false);
        }
        self.set(key, ttl_seconds).await?;
        Ok(true)
    }

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
