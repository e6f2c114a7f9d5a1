//! Daily write quota record kept in the quota ledger.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds in one quota day.
pub const SECONDS_IN_DAY: i64 = 86_400;

/// Lower bound applied to every ledger TTL written for a quota record.
pub const MIN_LEDGER_TTL_SECONDS: u64 = 60;

/// Per-fingerprint write counter for the current window.
///
/// Stored as JSON with `window_start` in Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindowRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub window_start: DateTime<Utc>,
    pub count: u32,
}

impl RateWindowRecord {
    /// A new window opened at `now` with one write already counted.
    pub fn opened_at(now: DateTime<Utc>) -> Self {
        Self {
            window_start: now,
            count: 1,
        }
    }

    /// Returns true once `now` is at or past the end of the window.
    pub fn has_elapsed(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.window_start >= window
    }

    /// Whole seconds left in the window at `now`, never negative.
    pub fn remaining_seconds(&self, now: DateTime<Utc>, window: Duration) -> u64 {
        let remaining = window - (now - self.window_start);
        remaining.num_seconds().max(0) as u64
    }
}

/// Length of a quota window spanning `days` days.
pub fn window_length(days: u32) -> Duration {
    Duration::seconds(i64::from(days) * SECONDS_IN_DAY)
}

/// Applies the ledger TTL floor.
pub fn ledger_ttl(seconds: u64) -> u64 {
    seconds.max(MIN_LEDGER_TTL_SECONDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_elapsed_boundary() {
        let record = RateWindowRecord::opened_at(start());
        let window = window_length(1);

        assert!(!record.has_elapsed(start() + Duration::seconds(86_399), window));
        assert!(record.has_elapsed(start() + Duration::seconds(86_400), window));
    }

    #[test]
    fn test_remaining_seconds() {
        let record = RateWindowRecord::opened_at(start());
        let window = window_length(1);

        assert_eq!(record.remaining_seconds(start(), window), 86_400);
        assert_eq!(
            record.remaining_seconds(start() + Duration::hours(23), window),
            3_600
        );
        assert_eq!(
            record.remaining_seconds(start() + Duration::days(2), window),
            0
        );
    }

    #[test]
    fn test_ledger_ttl_floor() {
        assert_eq!(ledger_ttl(0), 60);
        assert_eq!(ledger_ttl(59), 60);
        assert_eq!(ledger_ttl(3_600), 3_600);
    }

    #[test]
    fn test_record_json_shape() {
        let record = RateWindowRecord {
            window_start: start(),
            count: 3,
        };
        let json = serde_json::to_value(record).unwrap();

        assert_eq!(json["count"], 3);
        assert_eq!(json["window_start"], start().timestamp_millis());

        let back: RateWindowRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
