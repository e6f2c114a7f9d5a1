//! Per-client request pacing and daily write quota.
//!
//! Both limiters keep their state in a TTL ledger outside the process, keyed
//! by client fingerprint. They deliberately differ on ledger failure:
//! pacing reports [`PacingOutcome::Unavailable`], quota reports
//! [`QuotaOutcome::LedgerUnavailable`], and each caller decides what to answer.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::RateWindowRecord;
use crate::domain::entities::rate_window::{ledger_ttl, window_length};
use crate::infrastructure::ledger::{PacingCache, QuotaLedger};

const PACING_PREFIX: &str = "pacing:";
const QUOTA_PREFIX: &str = "quota:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingOutcome {
    Allowed,
    Denied,
    Unavailable,
}

/// Minimum interval between requests of one client.
///
/// The presence of a marker denies the request. Check and set are a single
/// conditional write where the backend supports it.
pub struct PacingLimiter {
    cache: Arc<dyn PacingCache>,
}

impl PacingLimiter {
    pub fn new(cache: Arc<dyn PacingCache>) -> Self {
        Self { cache }
    }

    /// Admits the request and starts a new interval, or denies it.
    ///
    /// A denied request leaves the existing marker untouched.
    pub async fn allow(&self, fingerprint: &str, interval_seconds: u64) -> PacingOutcome {
        let key = format!("{}{}", PACING_PREFIX, fingerprint);

        match self.cache.set_if_absent(&key, interval_seconds).await {
            Ok(true) => PacingOutcome::Allowed,
            Ok(false) => {
                debug!("Pacing denied for {}", fingerprint);
                PacingOutcome::Denied
            }
            Err(e) => {
                error!("Pacing ledger call failed: {}", e);
                PacingOutcome::Unavailable
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaOutcome {
    Ok,
    UserLimit,
    LedgerUnavailable,
}

/// Rolling write quota per client.
pub struct QuotaLimiter {
    ledger: Arc<dyn QuotaLedger>,
    clock: Arc<dyn Clock>,
}

impl QuotaLimiter {
    pub fn new(ledger: Arc<dyn QuotaLedger>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }

    /// Counts one write against the client's current window.
    ///
    /// # Algorithm
    ///
    /// 1. No record, an unreadable record, or an elapsed window: write a fresh
    ///    record with `count = 1` and TTL = full window.
    /// 2. `count >= max_per_window`: deny without touching the record.
    /// 3. Otherwise increment and rewrite with TTL = remaining window.
    ///
    /// Every TTL is floored at 60 seconds. The elapsed check runs on the
    /// stored `window_start`, so the floor never extends an expired window.
    pub async fn consume(
        &self,
        fingerprint: &str,
        max_per_window: u32,
        window_days: u32,
    ) -> QuotaOutcome {
        let key = format!("{}{}", QUOTA_PREFIX, fingerprint);
        let now = self.clock.now();
        let window = window_length(window_days);

        let stored = match self.ledger.get(&key).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Quota ledger read failed: {}", e);
                return QuotaOutcome::LedgerUnavailable;
            }
        };

        let current = stored.and_then(|raw| {
            serde_json::from_str::<RateWindowRecord>(&raw)
                .inspect_err(|e| warn!("Discarding unreadable quota record: {}", e))
                .ok()
        });

        let (record, ttl) = match current {
            Some(record) if !record.has_elapsed(now, window) => {
                if record.count >= max_per_window {
                    return QuotaOutcome::UserLimit;
                }
                let next = RateWindowRecord {
                    window_start: record.window_start,
                    count: record.count + 1,
                };
                (next, record.remaining_seconds(now, window))
            }
            _ => (
                RateWindowRecord::opened_at(now),
                window.num_seconds().max(0) as u64,
            ),
        };

        self.write(&key, &record, ledger_ttl(ttl)).await
    }

    async fn write(&self, key: &str, record: &RateWindowRecord, ttl: u64) -> QuotaOutcome {
        let value = match serde_json::to_string(record) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to encode quota record: {}", e);
                return QuotaOutcome::LedgerUnavailable;
            }
        };

        match self.ledger.put(key, &value, ttl).await {
            Ok(()) => QuotaOutcome::Ok,
            Err(e) => {
                error!("Quota ledger write failed: {}", e);
                QuotaOutcome::LedgerUnavailable
            }
        }
    }
}
