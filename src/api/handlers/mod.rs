//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod redirect;
pub mod root;
pub mod shorten;

pub use health::health_handler;
pub use links::{
    delete_link_handler, list_links_handler, sync_counter_handler, verify_link_handler,
};
pub use redirect::redirect_handler;
pub use root::{fallback_handler, favicon_handler, root_handler};
pub use shorten::shorten_handler;
