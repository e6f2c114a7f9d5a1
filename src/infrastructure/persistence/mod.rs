//! Repository implementations over the document store.
//!
//! # Repositories
//!
//! - [`StoreLinkRepository`] - Link records and the running link counter

pub mod store_link_repository;

pub use store_link_repository::StoreLinkRepository;
