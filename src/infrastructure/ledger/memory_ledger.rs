//! In-process ledger with clock-driven expiry.

use super::service::{LedgerError, LedgerResult, PacingCache, QuotaLedger};
use crate::domain::clock::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Writes between two sweeps of expired slots.
const SWEEP_EVERY: u64 = 1024;

struct Slot {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Slot {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Ledger used when no Redis is configured, and by tests.
///
/// Expired entries read as absent. They are dropped on access, and every
/// [`SWEEP_EVERY`] writes all expired slots are evicted at once.
pub struct MemoryLedger {
    entries: DashMap<String, Slot>,
    clock: Arc<dyn Clock>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl MemoryLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        debug!("Using in-memory ledger");
        Self {
            entries: DashMap::new(),
            clock,
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    /// Toggles simulated ledger outages.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> LedgerResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::Backend("memory ledger disabled".to_string()))
        }
    }

    fn expiry(&self, ttl_seconds: u64) -> DateTime<Utc> {
        self.clock.now() + Duration::seconds(ttl_seconds as i64)
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let value = self
            .entries
            .get(key)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.value.clone());

        if value.is_none() {
            self.entries.remove_if(key, |_, slot| !slot.is_live(now));
        }
        value
    }

    /// Counts a write and evicts expired slots on every [`SWEEP_EVERY`]th one.
    ///
    /// Must not be called while holding a map guard.
    fn note_write(&self) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_EVERY != 0 {
            return;
        }

        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, slot| slot.is_live(now));
        debug!(
            "Evicted {} expired ledger entries",
            before.saturating_sub(self.entries.len())
        );
    }

    fn insert(&self, key: &str, value: String, ttl_seconds: u64) {
        self.note_write();
        let slot = Slot {
            value,
            expires_at: self.expiry(ttl_seconds),
        };
        self.entries.insert(key.to_string(), slot);
    }
}

#[async_trait]
impl QuotaLedger for MemoryLedger {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.live_value(key))
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> LedgerResult<()> {
        self.ensure_available()?;
        self.insert(key, value.to_string(), ttl_seconds);
        Ok(())
    }
}

#[async_trait]
impl PacingCache for MemoryLedger {
    async fn exists(&self, key: &str) -> LedgerResult<bool> {
        self.ensure_available()?;
        Ok(self.live_value(key).is_some())
    }

    async fn set(&self, key: &str, ttl_seconds: u64) -> LedgerResult<()> {
        self.ensure_available()?;
        self.insert(key, "1".to_string(), ttl_seconds);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, ttl_seconds: u64) -> LedgerResult<bool> {
        self.ensure_available()?;
        self.note_write();
        let now = self.clock.now();
        let slot = Slot {
            value: "1".to_string(),
            expires_at: self.expiry(ttl_seconds),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(false);
                }
                occupied.insert(slot);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
                Ok(true)
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.ensure_available().is_ok()
    }
}
