//! Short link entity.

use chrono::{DateTime, Utc};

/// A stored mapping from a short id to a long URL.
///
/// The `id` is a deterministic function of the normalized `long_url`, so a
/// record is never rewritten with a different URL. The only mutation after
/// creation is the one-way `is_verified` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: String,
    pub long_url: String,
    pub post_date: DateTime<Utc>,
    pub is_verified: bool,
}

impl ShortLink {
    /// Creates a new, not yet verified link posted at `post_date`.
    pub fn unverified(id: String, long_url: String, post_date: DateTime<Utc>) -> Self {
        Self {
            id,
            long_url,
            post_date,
            is_verified: false,
        }
    }

    /// Returns true if this record stores exactly `normalized_url`.
    ///
    /// A record at the same id with any other URL is a hash collision.
    pub fn points_to(&self, normalized_url: &str) -> bool {
        self.long_url == normalized_url
    }
}
