//! One-way link verification.

use std::sync::Arc;
use tracing::{error, info};

use crate::domain::repositories::LinkRepository;

/// Result of a verification attempt.
///
/// `unverified -> verified` is the only transition; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    VerifiedNow,
    AlreadyVerified,
    NotFound,
    Error,
}

/// Service for the link verification state machine.
pub struct VerificationService<R: LinkRepository> {
    repository: Arc<R>,
}

impl<R: LinkRepository> VerificationService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Marks the link at `id` as verified.
    ///
    /// Idempotent: an already verified link is reported as such without a write.
    /// Any store failure, on read or on patch, yields [`VerificationStatus::Error`].
    pub async fn verify(&self, id: &str) -> VerificationStatus {
        let link = match self.repository.find(id).await {
            Ok(Some(link)) => link,
            Ok(None) => return VerificationStatus::NotFound,
            Err(e) => {
                error!("Verification read failed for {}: {}", id, e);
                return VerificationStatus::Error;
            }
        };

        if link.is_verified {
            return VerificationStatus::AlreadyVerified;
        }

        match self.repository.mark_verified(id).await {
            Ok(()) => {
                info!("Link {} verified", id);
                VerificationStatus::VerifiedNow
            }
            Err(e) => {
                error!("Verification write failed for {}: {}", id, e);
                VerificationStatus::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShortLink;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::AppError;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn link(verified: bool) -> ShortLink {
        ShortLink {
            id: "abcdefghij".to_string(),
            long_url: "https://example.com/".to_string(),
            post_date: Utc::now(),
            is_verified: verified,
        }
    }

    #[tokio::test]
    async fn test_verify_unverified_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find()
            .with(eq("abcdefghij"))
            .times(1)
            .returning(|_| Ok(Some(link(false))));
        repo.expect_mark_verified()
            .with(eq("abcdefghij"))
            .times(1)
            .returning(|_| Ok(()));

        let service = VerificationService::new(Arc::new(repo));
        assert_eq!(
            service.verify("abcdefghij").await,
            VerificationStatus::VerifiedNow
        );
    }

    #[tokio::test]
    async fn test_verify_already_verified_does_not_write() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(Some(link(true))));
        repo.expect_mark_verified().times(0);

        let service = VerificationService::new(Arc::new(repo));
        assert_eq!(
            service.verify("abcdefghij").await,
            VerificationStatus::AlreadyVerified
        );
    }

    #[tokio::test]
    async fn test_verify_missing_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_mark_verified().times(0);

        let service = VerificationService::new(Arc::new(repo));
        assert_eq!(
            service.verify("abcdefghij").await,
            VerificationStatus::NotFound
        );
    }

    #[tokio::test]
    async fn test_verify_store_errors() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find()
            .returning(|_| Err(AppError::upstream_unavailable("timeout")));

        let service = VerificationService::new(Arc::new(repo));
        assert_eq!(service.verify("abcdefghij").await, VerificationStatus::Error);

        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(Some(link(false))));
        repo.expect_mark_verified()
            .returning(|_| Err(AppError::upstream_unavailable("timeout")));

        let service = VerificationService::new(Arc::new(repo));
        assert_eq!(service.verify("abcdefghij").await, VerificationStatus::Error);
    }
}
