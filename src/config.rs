//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Required Variables
//!
//! - `STORE_URL` - Base URL of the document store (e.g. `https://project.firebaseio.com`)
//! - `STORE_SECRET_PATH` - Secret path prefix under which all records live
//! - `HASH_KEY` - Key for client fingerprinting
//! - `ADMIN_KEY` - Key for privileged endpoints
//!
//! ## Redis (optional)
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! ```
//!
//! or, from individual components:
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! Without Redis the rate-limit ledger lives in process memory.
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `BEHIND_PROXY` - Read client IP from proxy headers (default: `false`)
//! - `PUBLIC_BASE_URL` - Prefix of returned short links (default: derived from `Host`)
//! - `RATE_LIMIT_INTERVAL_S` - Pacing interval (default: 1, min: 1)
//! - `MAX_DAILY_WRITES` - Writes per client per window (default: 10, min: 1)
//! - `QUOTA_WINDOW_DAYS` - Quota window length (default: 1, min: 1)
//! - `STORE_TIMEOUT_MS` - Timeout of every store and ledger call (default: 6000, min: 1000)
//! - `STORE_CAPACITY` - Maximum number of stored links (default: 1000, min: 50)
//! - `DEFAULT_PAGE_SIZE` - Page size when `count` is omitted (default: 15, min: 5)
//! - `MAX_PAGE_SIZE` - Largest accepted `count` (default: 50, min: 10)
//! - `SHORT_ID_LENGTH` - Length of generated ids (default: 14, min: 10, max: 64)
//! - `MAX_URL_LENGTH` - Longest accepted normalized URL (default: 2000, min: 100)

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_secret_path: String,
    pub hash_key: String,
    pub admin_key: String,
    pub redis_url: Option<String>,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// When true, the client IP is read from `CF-Connecting-IP`, `X-Forwarded-For`
    /// or `X-Real-IP`. Enable only behind a trusted reverse proxy.
    pub behind_proxy: bool,
    pub public_base_url: Option<String>,

    // ── Limits ──────────────────────────────────────────────────────────────
    pub rate_limit_interval_s: u64,
    pub max_daily_writes: u32,
    pub quota_window_days: u32,
    pub store_timeout_ms: u64,
    pub store_capacity: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub short_id_length: usize,
    pub max_url_length: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let store_url = required("STORE_URL")?;
        let store_secret_path = required("STORE_SECRET_PATH")?;
        let hash_key = required("HASH_KEY")?;
        let admin_key = required("ADMIN_KEY")?;

        let redis_url = Self::load_redis_url();

        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|v| v.trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            store_url,
            store_secret_path,
            hash_key,
            admin_key,
            redis_url,
            listen_addr,
            log_level,
            log_format,
            behind_proxy,
            public_base_url,
            rate_limit_interval_s: parse_or("RATE_LIMIT_INTERVAL_S", 1)?,
            max_daily_writes: parse_or("MAX_DAILY_WRITES", 10)?,
            quota_window_days: parse_or("QUOTA_WINDOW_DAYS", 1)?,
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", 6000)?,
            store_capacity: parse_or("STORE_CAPACITY", 1000)?,
            default_page_size: parse_or("DEFAULT_PAGE_SIZE", 15)?,
            max_page_size: parse_or("MAX_PAGE_SIZE", 50)?,
            short_id_length: parse_or("SHORT_ID_LENGTH", 14)?,
            max_url_length: parse_or("MAX_URL_LENGTH", 2000)?,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty());
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match password {
            Some(pwd) => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            None => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is below its minimum, the page sizes are
    /// inconsistent, or a URL or format setting is malformed.
    pub fn validate(&self) -> Result<()> {
        check_min("RATE_LIMIT_INTERVAL_S", self.rate_limit_interval_s, 1)?;
        check_min("MAX_DAILY_WRITES", self.max_daily_writes as u64, 1)?;
        check_min("QUOTA_WINDOW_DAYS", self.quota_window_days as u64, 1)?;
        check_min("STORE_TIMEOUT_MS", self.store_timeout_ms, 1000)?;
        check_min("STORE_CAPACITY", self.store_capacity, 50)?;
        check_min("DEFAULT_PAGE_SIZE", self.default_page_size as u64, 5)?;
        check_min("MAX_PAGE_SIZE", self.max_page_size as u64, 10)?;
        check_min("SHORT_ID_LENGTH", self.short_id_length as u64, 10)?;
        check_min("MAX_URL_LENGTH", self.max_url_length as u64, 100)?;

        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "DEFAULT_PAGE_SIZE ({}) must not exceed MAX_PAGE_SIZE ({})",
                self.default_page_size,
                self.max_page_size
            );
        }

        if self.short_id_length > 64 {
            anyhow::bail!(
                "SHORT_ID_LENGTH is too large (max: 64), got {}",
                self.short_id_length
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.store_url.starts_with("https://") && !self.store_url.starts_with("http://") {
            anyhow::bail!(
                "STORE_URL must start with 'https://' or 'http://', got '{}'",
                self.store_url
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(redis_url)
            );
        }

        if self.hash_key.is_empty() {
            anyhow::bail!("HASH_KEY must not be empty");
        }
        if self.admin_key.is_empty() {
            anyhow::bail!("ADMIN_KEY must not be empty");
        }

        Ok(())
    }

    /// Timeout applied to every store and ledger call.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Store: {} (secret path hidden)", self.store_url);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Redis: {} (enabled)", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Redis: disabled, using in-process ledger");
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!(
            "  Pacing: 1 request per {}s, quota: {} writes per {} day(s)",
            self.rate_limit_interval_s,
            self.max_daily_writes,
            self.quota_window_days
        );
        tracing::info!(
            "  Store capacity: {}, timeout: {}ms",
            self.store_capacity,
            self.store_timeout_ms
        );
        tracing::info!(
            "  Short id length: {}, max URL length: {}",
            self.short_id_length,
            self.max_url_length
        );
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} must be set", name))
}

/// Reads `name` as a `T`, falling back to `default` when it is unset.
fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

fn check_min(name: &str, value: u64, min: u64) -> Result<()> {
    if value < min {
        anyhow::bail!("{} must be at least {}, got {}", name, min, value);
    }
    Ok(())
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
