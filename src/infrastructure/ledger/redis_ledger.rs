//! Redis-backed ledger implementation.

use super::service::{LedgerError, LedgerResult, PacingCache, QuotaLedger};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};

/// Redis ledger for quota records and pacing markers.
///
/// Uses connection pooling via `ConnectionManager`. Every command is bounded
/// by `op_timeout`; the in-flight future is dropped when it elapses.
#[derive(Clone)]
pub struct RedisLedger {
    client: ConnectionManager,
    op_timeout: Duration,
}

impl RedisLedger {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Backend`] if the URL is invalid or the connection
    /// cannot be established, and [`LedgerError::Timeout`] if the PING does not
    /// answer within `op_timeout`.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> LedgerResult<Self> {
        info!("Connecting to Redis ledger");

        let client = Client::open(redis_url)
            .map_err(|e| LedgerError::Backend(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| LedgerError::Backend(format!("Failed to connect to Redis: {}", e)))?;

        let ledger = Self {
            client: manager,
            op_timeout,
        };

        let mut conn = ledger.client.clone();
        ledger.bounded(conn.ping::<()>()).await?;

        info!("✓ Connected to Redis");

        Ok(ledger)
    }

    async fn bounded<T, F>(&self, fut: F) -> LedgerResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Redis command failed: {}", e);
                Err(LedgerError::Backend(e.to_string()))
            }
            Err(_) => {
                error!("Redis command timed out after {:?}", self.op_timeout);
                Err(LedgerError::Timeout)
            }
        }
    }
}

#[async_trait]
impl QuotaLedger for RedisLedger {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        let mut conn = self.client.clone();
        self.bounded(conn.get::<_, Option<String>>(key)).await
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> LedgerResult<()> {
        let mut conn = self.client.clone();
        self.bounded(conn.set_ex::<_, _, ()>(key, value, ttl_seconds))
            .await?;
        debug!("Ledger SET {} (TTL: {}s)", key, ttl_seconds);
        Ok(())
    }
}

#[async_trait]
impl PacingCache for RedisLedger {
    async fn exists(&self, key: &str) -> LedgerResult<bool> {
        let mut conn = self.client.clone();
        self.bounded(conn.exists::<_, bool>(key)).await
    }

    async fn set(&self, key: &str, ttl_seconds: u64) -> LedgerResult<()> {
        let mut conn = self.client.clone();
        self.bounded(conn.set_ex::<_, _, ()>(key, 1, ttl_seconds))
            .await
    }

    async fn set_if_absent(&self, key: &str, ttl_seconds: u64) -> LedgerResult<bool> {
        let mut conn = self.client.clone();
        let reply: Option<String> = self
            .bounded(
                redis::cmd("SET")
                    .arg(key)
                    .arg(1)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl_seconds)
                    .query_async(&mut conn),
            )
            .await?;
        Ok(reply.is_some())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        self.bounded(conn.ping::<()>()).await.is_ok()
    }
}
