//! HTTP server initialization and runtime setup.
//!
//! Handles store and ledger setup, state wiring, and the Axum server lifecycle.

use crate::config::Config;
use crate::domain::clock::{Clock, SystemClock};
use crate::infrastructure::ledger::{MemoryLedger, PacingCache, QuotaLedger, RedisLedger};
use crate::infrastructure::store::{FirebaseStore, Store};
use crate::routes::app_router;
use crate::state::{AppState, Backends};

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

type Ledgers = (Arc<dyn QuotaLedger>, Arc<dyn PacingCache>);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Document store client
/// - Redis ledger (or in-process fallback)
/// - Application state and router
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The store client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store: Arc<dyn Store> = Arc::new(FirebaseStore::new(
        &config.store_url,
        &config.store_secret_path,
        config.store_timeout(),
    )?);

    if store.health_check().await {
        tracing::info!("Document store reachable");
    } else {
        tracing::warn!("Document store not reachable at startup, requests will answer 503");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (quota_ledger, pacing_cache) = connect_ledgers(&config, clock.clone()).await;

    let state = AppState::new(
        &config,
        Backends {
            store,
            quota_ledger,
            pacing_cache,
            clock,
        },
    )?;

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Connects the rate-limit ledger.
///
/// Redis when configured and reachable, in-process memory otherwise. The
/// memory ledger is per instance: limits are not shared between replicas and
/// reset on restart.
async fn connect_ledgers(config: &Config, clock: Arc<dyn Clock>) -> Ledgers {
    if let Some(redis_url) = &config.redis_url {
        match RedisLedger::connect(redis_url, config.store_timeout()).await {
            Ok(redis) => {
                tracing::info!("Rate-limit ledger enabled (Redis)");
                let redis = Arc::new(redis);
                let quota: Arc<dyn QuotaLedger> = redis.clone();
                let pacing: Arc<dyn PacingCache> = redis;
                return (quota, pacing);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using in-process ledger.", e);
            }
        }
    } else {
        tracing::warn!("Redis not configured, rate limits are kept in process memory");
    }

    let memory = Arc::new(MemoryLedger::new(clock));
    let quota: Arc<dyn QuotaLedger> = memory.clone();
    let pacing: Arc<dyn PacingCache> = memory;
    (quota, pacing)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
