//! API route configuration.
//!
//! Both groups run behind request pacing; the admin group additionally
//! requires the admin key via [`crate::api::middleware::auth`].

use crate::api::dto::shorten::MAX_BODY_BYTES;
use crate::api::handlers::{
    delete_link_handler, list_links_handler, shorten_handler, sync_counter_handler,
    verify_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

/// Public write endpoint.
///
/// - `POST /post-url` - Create a short link
///
/// Bodies are read up to [`MAX_BODY_BYTES`].
pub fn public_routes() -> Router<AppState> {
    Router::new().route(
        "/post-url",
        post(shorten_handler).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
    )
}

/// Privileged endpoints, protected by the admin key.
///
/// # Endpoints
///
/// - `GET    /urls`          - List links (cursor paginated)
/// - `PATCH  /verify/{id}`   - Mark a link as verified
/// - `DELETE /delete/{id}`   - Delete a link
/// - `PATCH  /sync-counter`  - Recount links and overwrite the counter
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", get(list_links_handler))
        .route("/verify/{id}", patch(verify_link_handler))
        .route("/delete/{id}", delete(delete_link_handler))
        .route("/sync-counter", patch(sync_counter_handler))
}
