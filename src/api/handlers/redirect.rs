//! Handler for short URL redirect.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::extract::ValidId;
use crate::error::AppError;
use crate::state::AppState;

const NO_CACHE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// Redirects a short id to its long URL.
///
/// # Endpoint
///
/// `GET /url/{id}`
///
/// # Status
///
/// - **301 Moved Permanently** for verified links
/// - **302 Found** for links not yet verified
///
/// Both forms are sent with no-cache headers, so a later verification or
/// deletion is picked up by clients on the next visit.
///
/// # Errors
///
/// Returns 400 Bad Request if the id does not match the id pattern.
/// Returns 404 Not Found if no link is stored at the id.
/// Returns 503 Service Unavailable if the store cannot be reached.
pub async fn redirect_handler(
    ValidId(id): ValidId,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let link = state.link_service.resolve(&id).await?;

    let status = if link.is_verified {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::FOUND
    };

    debug!("Redirecting {} with {}", id, status);

    Ok((
        status,
        [
            (header::LOCATION, link.long_url.as_str()),
            (header::CACHE_CONTROL, NO_CACHE),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
    )
        .into_response())
}
