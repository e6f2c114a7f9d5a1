//! Utility functions for id generation, URL processing, and request handling.
//!
//! - [`short_id`] - Deterministic short id hashing and id path validation
//! - [`url_normalizer`] - URL normalization and target validation
//! - [`fingerprint`] - Salted client fingerprints for rate-limit keys
//! - [`constant_time`] - Timing-safe secret comparison
//! - [`client_ip`] - Client address extraction from HTTP requests

pub mod client_ip;
pub mod constant_time;
pub mod fingerprint;
pub mod short_id;
pub mod url_normalizer;
