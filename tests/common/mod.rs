#![allow(dead_code)]

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use link_gateway::config::Config;
use link_gateway::domain::clock::ManualClock;
use link_gateway::infrastructure::ledger::MemoryLedger;
use link_gateway::infrastructure::store::{MemoryStore, Store};
use link_gateway::routes::build_router;
use link_gateway::state::{AppState, Backends};

pub const ADMIN_KEY: &str = "test-admin-key";
pub const PUBLIC_BASE_URL: &str = "https://sho.rt";
pub const ID_LENGTH: usize = 10;

static NEXT_CLIENT: AtomicU32 = AtomicU32::new(1);

/// Running test server and handles on its in-memory backends.
pub struct TestApp {
    pub server: TestServer,
    /// The router behind `server`, for requests axum-test cannot shape.
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub ledger: Arc<MemoryLedger>,
    pub clock: Arc<ManualClock>,
}

pub fn test_config() -> Config {
    Config {
        store_url: "https://links.example.com".to_string(),
        store_secret_path: "/secret".to_string(),
        hash_key: "test-hash-key".to_string(),
        admin_key: ADMIN_KEY.to_string(),
        redis_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        behind_proxy: true,
        public_base_url: Some(PUBLIC_BASE_URL.to_string()),
        rate_limit_interval_s: 1,
        max_daily_writes: 3,
        quota_window_days: 1,
        store_timeout_ms: 1000,
        store_capacity: 50,
        default_page_size: 5,
        max_page_size: 10,
        short_id_length: ID_LENGTH,
        max_url_length: 100,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ));
    let ledger = Arc::new(MemoryLedger::new(clock.clone()));

    let state = AppState::new(
        &config,
        Backends {
            store: store.clone(),
            quota_ledger: ledger.clone(),
            pacing_cache: ledger.clone(),
            clock: clock.clone(),
        },
    )
    .unwrap();

    let router = build_router(state);
    let server = TestServer::new(router.clone()).unwrap();

    TestApp {
        server,
        router,
        store,
        ledger,
        clock,
    }
}

/// A client address no other request in this test binary has used.
pub fn fresh_ip() -> String {
    let n = NEXT_CLIENT.fetch_add(1, Ordering::Relaxed);
    format!("198.51.{}.{}", n / 250, n % 250 + 1)
}

/// Sends the request from `ip`.
pub fn from_ip(request: TestRequest, ip: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static("cf-connecting-ip"),
        HeaderValue::from_str(ip).unwrap(),
    )
}

/// Sends the request from a client that has not been paced yet.
pub fn from_new_client(request: TestRequest) -> TestRequest {
    from_ip(request, &fresh_ip())
}

/// Sends the request from a new client with the admin key.
pub fn as_admin(request: TestRequest) -> TestRequest {
    from_new_client(request).add_header(
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {}", ADMIN_KEY)).unwrap(),
    )
}

/// Writes a link record straight into the store.
pub async fn seed_link(store: &MemoryStore, id: &str, long_url: &str, verified: bool) {
    store
        .put(
            &format!("urls/{}", id),
            json!({
                "long_url": long_url,
                "post_date": "2026-03-01T12:00:00.000Z",
                "is_verified": verified,
            }),
        )
        .await
        .unwrap();
}

pub async fn set_counter(store: &MemoryStore, value: i64) {
    store
        .patch("meta", json!({ "_url_counter": value }))
        .await
        .unwrap();
}

pub async fn counter(store: &MemoryStore) -> Option<i64> {
    store
        .get("meta/_url_counter", None)
        .await
        .unwrap()
        .and_then(|v| v.as_i64())
}
