//! Timing-safe secret comparison.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compares two secrets in time independent of where they differ.
///
/// Both sides are hashed first so the comparison runs over fixed-length
/// digests and does not leak the secret's length either.
pub fn constant_time_eq(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.as_slice().ct_eq(b.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_secrets() {
        assert!(constant_time_eq("s3cr3t-admin-key", "s3cr3t-admin-key"));
    }

    #[test]
    fn test_different_secrets() {
        assert!(!constant_time_eq("s3cr3t-admin-key", "s3cr3t-admin-kez"));
        assert!(!constant_time_eq("short", "s3cr3t-admin-key"));
        assert!(!constant_time_eq("", "s3cr3t-admin-key"));
    }

    #[test]
    fn test_empty_matches_only_empty() {
        assert!(constant_time_eq("", ""));
    }
}
