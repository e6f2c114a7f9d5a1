//! Reconciliation of the cached link counter.

use std::sync::Arc;
use tracing::{error, info};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Outcome of a counter resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncReport {
    pub actual_count: u64,
    pub success: bool,
}

/// Keeps the running counter honest.
///
/// Increments after writes are best effort and can be lost; [`CounterService::resync`]
/// restores the counter from a full key enumeration.
pub struct CounterService<R: LinkRepository> {
    repository: Arc<R>,
}

impl<R: LinkRepository> CounterService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Current cached counter value, `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UpstreamUnavailable`] on store failure.
    pub async fn current(&self) -> Result<Option<i64>, AppError> {
        self.repository.read_counter().await
    }

    /// Counts stored links and overwrites the counter with the result.
    ///
    /// The write is an absolute set, never a delta. If the enumeration
    /// fails, nothing is written and `actual_count` is 0.
    pub async fn resync(&self) -> ResyncReport {
        let actual_count = match self.repository.count_ids().await {
            Ok(count) => count,
            Err(e) => {
                error!("Counter resync could not enumerate links: {}", e);
                return ResyncReport {
                    actual_count: 0,
                    success: false,
                };
            }
        };

        let success = match self.repository.set_counter(actual_count).await {
            Ok(()) => {
                info!("Counter resynced to {}", actual_count);
                true
            }
            Err(e) => {
                error!("Unable to update the link counter: {}", e);
                false
            }
        };

        ResyncReport {
            actual_count,
            success,
        }
    }
}
