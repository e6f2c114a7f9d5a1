//! # Link Gateway
//!
//! A URL shortening gateway over a REST document store, built with Axum.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, repository traits and the clock
//! - **Application Layer** ([`application`]) - Link lifecycle, rate limiting,
//!   pagination, verification and counter reconciliation
//! - **Infrastructure Layer** ([`infrastructure`]) - Document store clients,
//!   rate-limit ledgers and the store-backed repository
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Deterministic short ids derived from the normalized URL, with
//!   collisions rejected instead of overwritten
//! - Per-client request pacing and a rolling daily write quota, kept in Redis
//!   or in process memory
//! - One-way link verification: verified links redirect with 301, others with 302
//! - Cursor pagination over the stored links
//! - A cached link counter enforcing store capacity, with on-demand resync
//!
//! ## Quick Start
//!
//! ```bash
//! export STORE_URL="https://project.firebaseio.com"
//! export STORE_SECRET_PATH="/s3cr3t"
//! export HASH_KEY="..."
//! export ADMIN_KEY="..."
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AuthService, CounterService, CreateOutcome, LinkService, PaginationService,
        VerificationService,
    };
    pub use crate::domain::entities::ShortLink;
    pub use crate::error::AppError;
    pub use crate::state::{AppState, Backends};
}
