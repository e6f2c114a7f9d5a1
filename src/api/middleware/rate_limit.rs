//! Per-client request pacing middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::net::SocketAddr;

use crate::application::services::PacingOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Fingerprint of the calling client, set by [`layer`] for downstream handlers.
#[derive(Debug, Clone)]
pub struct ClientFingerprint(pub String);

/// Admits at most one request per client per `RATE_LIMIT_INTERVAL_S`.
///
/// The client is identified by the fingerprint of its address (see
/// [`crate::utils::client_ip`]). On success the fingerprint is stored as a
/// [`ClientFingerprint`] request extension.
///
/// # Errors
///
/// - `429 Too Many Requests` inside the interval, with `interval_seconds` in the details
/// - `503 Service Unavailable` when the pacing ledger cannot be reached
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let ip = client_ip(req.headers(), peer, st.settings.behind_proxy);
    let fingerprint = st.fingerprinter.fingerprint(&ip);
    let interval = st.settings.rate_limit_interval_s;

    match st.pacing.allow(&fingerprint, interval).await {
        PacingOutcome::Allowed => {}
        PacingOutcome::Denied => {
            return Err(AppError::rate_limited(
                format!("Rate limit exceeded: 1 request per {}s allowed", interval),
                json!({ "interval_seconds": interval }),
            ));
        }
        PacingOutcome::Unavailable => {
            return Err(AppError::upstream_unavailable("pacing ledger unavailable"));
        }
    }

    req.extensions_mut().insert(ClientFingerprint(fingerprint));

    Ok(next.run(req).await)
}
