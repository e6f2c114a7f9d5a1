//! HTTP middleware for request processing and protection.
//!
//! Provides admin authentication, request pacing, and observability middleware.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
