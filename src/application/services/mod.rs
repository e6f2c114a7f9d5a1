//! Business logic services for the application layer.

pub mod auth_service;
pub mod counter_service;
pub mod link_service;
pub mod pagination_service;
pub mod rate_limit_service;
pub mod verification_service;

pub use auth_service::AuthService;
pub use counter_service::{CounterService, ResyncReport};
pub use link_service::{CreateOutcome, LinkPolicy, LinkService};
pub use pagination_service::{LinkPage, PaginationService};
pub use rate_limit_service::{PacingLimiter, PacingOutcome, QuotaLimiter, QuotaOutcome};
pub use verification_service::{VerificationService, VerificationStatus};
