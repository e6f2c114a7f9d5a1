//! Shared application state injected into every handler.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::application::services::{
    AuthService, CounterService, LinkPolicy, LinkService, PacingLimiter, PaginationService,
    QuotaLimiter, VerificationService,
};
use crate::config::Config;
use crate::domain::clock::Clock;
use crate::infrastructure::ledger::{PacingCache, QuotaLedger};
use crate::infrastructure::persistence::StoreLinkRepository;
use crate::infrastructure::store::Store;
use crate::utils::fingerprint::Fingerprinter;
use crate::utils::short_id::IdMatcher;

/// Request-level settings the handlers and middleware read.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub rate_limit_interval_s: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub behind_proxy: bool,
    /// Prefix of returned short links. Derived from the `Host` header when unset.
    pub public_base_url: Option<String>,
}

/// External backends the state is wired to.
///
/// Production passes the Firebase store and the Redis ledger; tests pass
/// in-memory implementations and a manual clock.
pub struct Backends {
    pub store: Arc<dyn Store>,
    pub quota_ledger: Arc<dyn QuotaLedger>,
    pub pacing_cache: Arc<dyn PacingCache>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<StoreLinkRepository>>,
    pub pagination_service: Arc<PaginationService<StoreLinkRepository>>,
    pub verification_service: Arc<VerificationService<StoreLinkRepository>>,
    pub counter_service: Arc<CounterService<StoreLinkRepository>>,
    pub auth_service: Arc<AuthService>,
    pub pacing: Arc<PacingLimiter>,
    pub fingerprinter: Arc<Fingerprinter>,
    pub id_matcher: Arc<IdMatcher>,
    pub store: Arc<dyn Store>,
    pub pacing_cache: Arc<dyn PacingCache>,
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    /// Builds all services over `backends` using the limits in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id matcher or the fingerprinter cannot be built
    /// from the configured values.
    pub fn new(config: &Config, backends: Backends) -> Result<Self> {
        let repository = Arc::new(StoreLinkRepository::new(backends.store.clone()));

        let quota = Arc::new(QuotaLimiter::new(
            backends.quota_ledger,
            backends.clock.clone(),
        ));

        let policy = LinkPolicy {
            id_length: config.short_id_length,
            max_url_length: config.max_url_length,
            capacity: config.store_capacity,
            max_daily_writes: config.max_daily_writes,
            quota_window_days: config.quota_window_days,
        };

        let id_matcher =
            IdMatcher::new(config.short_id_length).context("Failed to build id matcher")?;
        let fingerprinter = Fingerprinter::new(&config.hash_key)
            .map_err(|e| anyhow::anyhow!("Failed to build fingerprinter: {}", e))?;

        Ok(Self {
            link_service: Arc::new(LinkService::new(
                repository.clone(),
                quota,
                backends.clock,
                policy,
            )),
            pagination_service: Arc::new(PaginationService::new(repository.clone())),
            verification_service: Arc::new(VerificationService::new(repository.clone())),
            counter_service: Arc::new(CounterService::new(repository)),
            auth_service: Arc::new(AuthService::new(config.admin_key.clone())),
            pacing: Arc::new(PacingLimiter::new(backends.pacing_cache.clone())),
            fingerprinter: Arc::new(fingerprinter),
            id_matcher: Arc::new(id_matcher),
            store: backends.store,
            pacing_cache: backends.pacing_cache,
            settings: Arc::new(ApiSettings {
                rate_limit_interval_s: config.rate_limit_interval_s,
                default_page_size: config.default_page_size,
                max_page_size: config.max_page_size,
                behind_proxy: config.behind_proxy,
                public_base_url: config.public_base_url.clone(),
            }),
        })
    }
}
