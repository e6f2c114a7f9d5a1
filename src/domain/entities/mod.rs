//! Core domain entities.
//!
//! - [`ShortLink`] - a short id mapped to a long URL, persisted in the store
//! - [`RateWindowRecord`] - a client's write counter for the current quota window

pub mod link;
pub mod rate_window;

pub use link::ShortLink;
pub use rate_window::RateWindowRecord;
