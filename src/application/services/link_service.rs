//! Link creation, resolution and deletion.

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::rate_limit_service::{QuotaLimiter, QuotaOutcome};
use crate::domain::clock::Clock;
use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::short_id::id_for;
use crate::utils::url_normalizer::{embeds_host, normalize_url};

/// Limits applied by [`LinkService::create`].
#[derive(Debug, Clone)]
pub struct LinkPolicy {
    pub id_length: usize,
    pub max_url_length: usize,
    /// Maximum number of stored links, compared against the cached counter.
    pub capacity: u64,
    pub max_daily_writes: u32,
    pub quota_window_days: u32,
}

/// Result of a successful create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new record was written.
    Created(ShortLink),
    /// The same URL was already stored under its id. Nothing was written and
    /// no quota was consumed.
    Reused(ShortLink),
}

impl CreateOutcome {
    pub fn link(&self) -> &ShortLink {
        match self {
            CreateOutcome::Created(link) | CreateOutcome::Reused(link) => link,
        }
    }
}

/// Service for the short link lifecycle.
///
/// Ids are derived from the normalized URL, never generated randomly, so the
/// store lookup both deduplicates and detects hash collisions.
pub struct LinkService<R: LinkRepository> {
    repository: Arc<R>,
    quota: Arc<QuotaLimiter>,
    clock: Arc<dyn Clock>,
    policy: LinkPolicy,
}

impl<R: LinkRepository> LinkService<R> {
    /// Creates a new link service.
    pub fn new(
        repository: Arc<R>,
        quota: Arc<QuotaLimiter>,
        clock: Arc<dyn Clock>,
        policy: LinkPolicy,
    ) -> Self {
        Self {
            repository,
            quota,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &LinkPolicy {
        &self.policy
    }

    /// Validates and normalizes a candidate long URL.
    ///
    /// `own_hosts` are the hosts this service answers on; a URL pointing back at
    /// one of them would redirect into itself.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL fails normalization, targets
    /// this service, or exceeds the configured maximum length.
    pub fn normalize(&self, long_url: &str, own_hosts: &[String]) -> Result<String, AppError> {
        let normalized = normalize_url(long_url).map_err(|e| {
            AppError::bad_request("Not a valid URL", json!({ "reason": e.to_string() }))
        })?;

        if own_hosts.iter().any(|host| embeds_host(&normalized, host)) {
            return Err(AppError::bad_request(
                "Not a valid URL",
                json!({ "reason": "URL points to this service" }),
            ));
        }

        if normalized.len() > self.policy.max_url_length {
            return Err(AppError::bad_request(
                format!("URL too long (max {})", self.policy.max_url_length),
                json!({ "max_length": self.policy.max_url_length }),
            ));
        }

        Ok(normalized)
    }

    /// Creates (or reuses) the short link for `long_url` on behalf of `fingerprint`.
    ///
    /// # Flow
    ///
    /// 1. Normalize and validate the URL
    /// 2. Hash it to its id and read any record stored there
    /// 3. Same URL: reuse. Different URL: collision, rejected without a write
    /// 4. Consume one unit of the client's daily quota
    /// 5. Read the counter (initializing it to 0 if absent) and enforce capacity
    /// 6. Write the record, then increment the counter on a best-effort basis
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for rejected URLs
    /// - [`AppError::Conflict`] on a hash collision
    /// - [`AppError::RateLimited`] when the daily quota is used up
    /// - [`AppError::CapacityExceeded`] when the store is full
    /// - [`AppError::UpstreamUnavailable`] when the store or ledger fails
    /// - [`AppError::GenerationFailed`] when the final write fails
    pub async fn create(
        &self,
        long_url: &str,
        fingerprint: &str,
        own_hosts: &[String],
    ) -> Result<CreateOutcome, AppError> {
        let normalized = self.normalize(long_url, own_hosts)?;
        let id = id_for(&normalized, self.policy.id_length);

        if let Some(existing) = self.repository.find(&id).await? {
            if existing.points_to(&normalized) {
                info!("Link {} reused", id);
                return Ok(CreateOutcome::Reused(existing));
            }

            warn!("Hash collision on {}", id);
            return Err(AppError::conflict(
                "Hash collision detected",
                json!({ "id": id }),
            ));
        }

        match self
            .quota
            .consume(
                fingerprint,
                self.policy.max_daily_writes,
                self.policy.quota_window_days,
            )
            .await
        {
            QuotaOutcome::Ok => {}
            QuotaOutcome::UserLimit => {
                return Err(AppError::rate_limited(
                    format!(
                        "Daily limit reached ({} writes)",
                        self.policy.max_daily_writes
                    ),
                    json!({ "max_daily_writes": self.policy.max_daily_writes }),
                ));
            }
            QuotaOutcome::LedgerUnavailable => {
                return Err(AppError::upstream_unavailable("quota ledger unavailable"));
            }
        }

        self.ensure_capacity().await?;

        let link = ShortLink::unverified(id, normalized, self.clock.now());
        self.repository
            .create(&link)
            .await
            .map_err(|e| AppError::generation_failed(json!({ "reason": e.to_string() })))?;

        if let Err(e) = self.repository.adjust_counter(1).await {
            warn!("Counter increment failed after creating {}: {}", link.id, e);
        }

        info!("Link {} created", link.id);
        Ok(CreateOutcome::Created(link))
    }

    async fn ensure_capacity(&self) -> Result<(), AppError> {
        let count = match self.repository.read_counter().await? {
            Some(count) => count,
            None => {
                info!("Counter not found, initializing to 0");
                if let Err(e) = self.repository.adjust_counter(0).await {
                    warn!("Counter initialization failed: {}", e);
                }
                0
            }
        };

        if count >= self.policy.capacity as i64 {
            warn!("Store capacity reached ({} links)", count);
            return Err(AppError::capacity_exceeded(
                "Database limit reached",
                json!({ "capacity": self.policy.capacity }),
            ));
        }

        Ok(())
    }

    /// Looks up the link stored at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing is stored at `id`.
    /// Returns [`AppError::UpstreamUnavailable`] on store failure.
    pub async fn resolve(&self, id: &str) -> Result<ShortLink, AppError> {
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| link_not_found(id))
    }

    /// Deletes the link at `id` and decrements the counter.
    ///
    /// The decrement is best effort, like the increment on create.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing is stored at `id`.
    /// Returns [`AppError::UpstreamUnavailable`] on store failure.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.repository.find(id).await?.is_none() {
            return Err(link_not_found(id));
        }

        self.repository.delete(id).await?;

        if let Err(e) = self.repository.adjust_counter(-1).await {
            warn!("Counter decrement failed after deleting {}: {}", id, e);
        }

        info!("Link {} deleted", id);
        Ok(())
    }
}

fn link_not_found(id: &str) -> AppError {
    AppError::not_found("Link unavailable or not found", json!({ "id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::ledger::{LedgerError, MemoryLedger, MockQuotaLedger};
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;

    const URL: &str = "https://example.com/path";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap()
    }

    fn policy() -> LinkPolicy {
        LinkPolicy {
            id_length: 14,
            max_url_length: 100,
            capacity: 50,
            max_daily_writes: 2,
            quota_window_days: 1,
        }
    }

    fn service_with(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        let clock = Arc::new(ManualClock::new(now()));
        let quota = Arc::new(QuotaLimiter::new(
            Arc::new(MemoryLedger::new(clock.clone())),
            clock.clone(),
        ));
        LinkService::new(Arc::new(repo), quota, clock, policy())
    }

    fn expected_id() -> String {
        id_for(URL, 14)
    }

    fn stored(url: &str) -> ShortLink {
        ShortLink::unverified(expected_id(), url.to_string(), now())
    }

    #[tokio::test]
    async fn test_create_new_link() {
        let mut repo = MockLinkRepository::new();
        let id = expected_id();

        repo.expect_find()
            .with(eq(id.clone()))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_read_counter().times(1).returning(|| Ok(Some(3)));
        repo.expect_create()
            .withf(move |link| {
                link.id == id && link.long_url == URL && !link.is_verified && link.post_date == now()
            })
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_adjust_counter()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = service_with(repo).create(URL, "fp", &[]).await.unwrap();

        assert!(matches!(outcome, CreateOutcome::Created(_)));
        assert_eq!(outcome.link().id, expected_id());
    }

    #[tokio::test]
    async fn test_create_reuses_same_url() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find()
            .times(1)
            .returning(|_| Ok(Some(stored(URL))));
        repo.expect_create().times(0);
        repo.expect_adjust_counter().times(0);
        repo.expect_read_counter().times(0);

        let outcome = service_with(repo).create(URL, "fp", &[]).await.unwrap();

        assert!(matches!(outcome, CreateOutcome::Reused(_)));
    }

    #[tokio::test]
    async fn test_create_collision_is_terminal() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find()
            .times(1)
            .returning(|_| Ok(Some(stored("https://other.example.com/"))));
        repo.expect_create().times(0);

        let result = service_with(repo).create(URL, "fp", &[]).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_url_before_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().times(0);

        let service = service_with(repo);

        for bad in ["ftp://example.com", "http://localhost/a", "http://example.com./a"] {
            let result = service.create(bad, "fp", &[]).await;
            assert!(matches!(result, Err(AppError::Validation { .. })), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_create_rejects_own_host() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().times(0);

        let result = service_with(repo)
            .create("https://sho.rt/url/abc", "fp", &["sho.rt:3000".to_string()])
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_rejects_too_long_url() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().times(0);

        let long = format!("https://example.com/{}", "a".repeat(100));
        let result = service_with(repo).create(&long, "fp", &[]).await;

        match result {
            Err(AppError::Validation { message, .. }) => assert!(message.contains("100")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_quota_exhausted() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_read_counter().returning(|| Ok(Some(0)));
        repo.expect_create().times(2).returning(|_| Ok(()));
        repo.expect_adjust_counter().returning(|_| Ok(()));

        let service = service_with(repo);

        assert!(service.create("https://a.example.com/", "fp", &[]).await.is_ok());
        assert!(service.create("https://b.example.com/", "fp", &[]).await.is_ok());

        let third = service.create("https://c.example.com/", "fp", &[]).await;
        assert!(matches!(third, Err(AppError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_create_ledger_unavailable() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_create().times(0);

        let mut ledger = MockQuotaLedger::new();
        ledger.expect_get().returning(|_| Err(LedgerError::Timeout));

        let clock = Arc::new(ManualClock::new(now()));
        let quota = Arc::new(QuotaLimiter::new(Arc::new(ledger), clock.clone()));
        let service = LinkService::new(Arc::new(repo), quota, clock, policy());

        let result = service.create(URL, "fp", &[]).await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_create_initializes_missing_counter() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_read_counter().times(1).returning(|| Ok(None));
        repo.expect_adjust_counter()
            .with(eq(0))
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_create().times(1).returning(|_| Ok(()));
        repo.expect_adjust_counter()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));

        assert!(service_with(repo).create(URL, "fp", &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_capacity_exceeded() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_read_counter().returning(|| Ok(Some(50)));
        repo.expect_create().times(0);

        let result = service_with(repo).create(URL, "fp", &[]).await;
        assert!(matches!(result, Err(AppError::CapacityExceeded { .. })));
    }

    #[tokio::test]
    async fn test_create_unreadable_counter_fails_closed() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_read_counter()
            .returning(|| Err(AppError::upstream_unavailable("timeout")));
        repo.expect_create().times(0);

        let result = service_with(repo).create(URL, "fp", &[]).await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_create_write_failure_is_generation_failed() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_read_counter().returning(|| Ok(Some(0)));
        repo.expect_create()
            .returning(|_| Err(AppError::upstream_unavailable("timeout")));
        repo.expect_adjust_counter().times(0);

        let result = service_with(repo).create(URL, "fp", &[]).await;
        assert!(matches!(result, Err(AppError::GenerationFailed { .. })));
    }

    #[tokio::test]
    async fn test_create_counter_increment_failure_is_ignored() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_read_counter().returning(|| Ok(Some(0)));
        repo.expect_create().returning(|_| Ok(()));
        repo.expect_adjust_counter()
            .returning(|_| Err(AppError::upstream_unavailable("timeout")));

        let outcome = service_with(repo).create(URL, "fp", &[]).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));

        let result = service_with(repo).resolve("abcdefghijklmn").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_decrements_counter() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(Some(stored(URL))));
        repo.expect_delete()
            .with(eq("abcdefghijklmn"))
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_adjust_counter()
            .with(eq(-1))
            .times(1)
            .returning(|_| Ok(()));

        assert!(service_with(repo).delete("abcdefghijklmn").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().returning(|_| Ok(None));
        repo.expect_delete().times(0);

        let result = service_with(repo).delete("abcdefghijklmn").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
