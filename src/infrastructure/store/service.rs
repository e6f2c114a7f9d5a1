//! Document store trait, query options and error types.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

/// Errors returned by a [`Store`] call.
///
/// A timed-out or failed call is always an error, never an empty result.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store call timed out")]
    Timeout,

    #[error("store transport error: {0}")]
    Transport(String),

    #[error("store responded with status {0}")]
    Status(u16),

    #[error("store response could not be decoded: {0}")]
    Decode(String),

    #[error("store unavailable")]
    Unavailable,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Query options for reads over an ordered child collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Order children by key.
    pub order_by_key: bool,
    /// Return at most this many children.
    pub limit_to_first: Option<usize>,
    /// Start strictly after this key.
    pub start_after: Option<String>,
    /// Return only child keys (`true` in place of nested objects).
    pub shallow: bool,
}

impl QueryOptions {
    /// Key enumeration without child bodies.
    pub fn shallow() -> Self {
        Self {
            shallow: true,
            ..Self::default()
        }
    }

    /// Key-ordered page of at most `limit` children after `start_after`.
    pub fn page(start_after: Option<String>, limit: usize) -> Self {
        Self {
            order_by_key: true,
            limit_to_first: Some(limit),
            start_after,
            shallow: false,
        }
    }
}

/// Child key order used by `orderBy="$key"`.
///
/// Keys that read as 32-bit integers come first in numeric order, then all
/// other keys in lexicographic order. `"007"` is not an integer key.
pub fn key_order(a: &str, b: &str) -> Ordering {
    match (integer_key(a), integer_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn integer_key(key: &str) -> Option<i32> {
    key.parse::<i32>()
        .ok()
        .filter(|n| n.to_string() == key)
}

/// A remote document database addressed by slash-separated paths.
///
/// No cross-path transactions are assumed. The only atomic read-modify-write
/// primitive is [`Store::apply_delta`].
///
/// # Implementations
///
/// - [`crate::infrastructure::store::FirebaseStore`] - REST client for a Realtime-Database-style API
/// - [`crate::infrastructure::store::MemoryStore`] - in-process JSON tree for tests and local runs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Reads the value at `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` if anything is stored at `path`
    /// - `Ok(None)` if nothing is stored there
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on timeout, transport failure or a non-success response.
    async fn get(&self, path: &str, query: Option<QueryOptions>) -> StoreResult<Option<Value>>;

    /// Replaces the value at `path`.
    async fn put(&self, path: &str, value: Value) -> StoreResult<()>;

    /// Removes the value at `path`.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Merges the fields of `partial` into the object at `path`.
    async fn patch(&self, path: &str, partial: Value) -> StoreResult<()>;

    /// Atomically adds `delta` to the integer at `path/field`, creating it if absent.
    async fn apply_delta(&self, path: &str, field: &str, delta: i64) -> StoreResult<()>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_keys_sort_first_numerically() {
        let mut keys = vec!["b", "10", "a1", "2", "-3"];
        keys.sort_by(|a, b| key_order(a, b));
        assert_eq!(keys, ["-3", "2", "10", "a1", "b"]);
    }

    #[test]
    fn test_padded_and_oversized_numbers_are_strings() {
        assert_eq!(key_order("007", "7"), Ordering::Greater);
        assert_eq!(key_order("9999999999", "a"), Ordering::Less);
        assert_eq!(key_order("9999999999", "42"), Ordering::Greater);
    }

    #[test]
    fn test_plain_keys_compare_lexicographically() {
        assert_eq!(key_order("abc", "abd"), Ordering::Less);
        assert_eq!(key_order("link000010", "link000009"), Ordering::Greater);
        assert_eq!(key_order("same", "same"), Ordering::Equal);
    }
}
