//! Repository trait for short link data access.

use crate::domain::entities::ShortLink;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links and the running link counter.
///
/// Every method is a single round trip to the store. There are no
/// multi-step transactions: callers must stay correct under arbitrary
/// interleavings with other writers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::StoreLinkRepository`] - document store implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its short id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortLink))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    /// A failed read is never reported as `Ok(None)`.
    async fn find(&self, id: &str) -> Result<Option<ShortLink>, AppError>;

    /// Writes a link record at `link.id`, replacing anything stored there.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn create(&self, link: &ShortLink) -> Result<(), AppError>;

    /// Removes the record at `id`. Removing an absent record succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Patches `is_verified = true` on the record at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn mark_verified(&self, id: &str) -> Result<(), AppError>;

    /// Lists up to `limit` links ordered by id, strictly after `after`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn list_after(
        &self,
        after: Option<String>,
        limit: usize,
    ) -> Result<Vec<ShortLink>, AppError>;

    /// Checks whether any record exists at `id` without fetching its body.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn exists(&self, id: &str) -> Result<bool, AppError>;

    /// Counts stored links with a shallow key enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn count_ids(&self) -> Result<u64, AppError>;

    /// Reads the cached link counter. `Ok(None)` means it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn read_counter(&self) -> Result<Option<i64>, AppError>;

    /// Applies `delta` to the counter with the store's atomic increment.
    ///
    /// A delta of zero creates the counter at zero if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn adjust_counter(&self, delta: i64) -> Result<(), AppError>;

    /// Overwrites the counter with an absolute value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure or timeout.
    async fn set_counter(&self, value: u64) -> Result<(), AppError>;
}
