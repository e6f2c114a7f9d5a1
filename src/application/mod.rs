//! Application layer services implementing business logic.
//!
//! Services consume repository and ledger traits and expose the operations the
//! HTTP handlers and the admin CLI compose.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, resolution and deletion
//! - [`services::rate_limit_service::PacingLimiter`] - Minimum interval between requests
//! - [`services::rate_limit_service::QuotaLimiter`] - Rolling daily write quota
//! - [`services::pagination_service::PaginationService`] - Cursor pagination
//! - [`services::verification_service::VerificationService`] - Link verification
//! - [`services::counter_service::CounterService`] - Counter reconciliation
//! - [`services::auth_service::AuthService`] - Admin key authorization

pub mod services;
