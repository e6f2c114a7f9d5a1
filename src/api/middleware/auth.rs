//! Admin key authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use tracing::warn;

use crate::{error::AppError, state::AppState};

/// Alternative header carrying the admin key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authenticates privileged requests with the admin key.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <key>
/// ```
///
/// or
///
/// ```text
/// x-api-key: <key>
/// ```
///
/// The Bearer token wins when both are present.
///
/// # Errors
///
/// Returns `401 Unauthorized` if no key is presented or the key does not match.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let presented = match AuthBearer::from_request_parts(&mut parts, &()).await {
        Ok(AuthBearer(token)) => Some(token.trim().to_string()),
        Err(_) => parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string()),
    };

    if let Err(e) = st.auth_service.authorize(presented.as_deref()) {
        warn!(
            method = %parts.method,
            path = %parts.uri.path(),
            "Invalid or missing admin key"
        );
        return Err(e);
    }

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}
