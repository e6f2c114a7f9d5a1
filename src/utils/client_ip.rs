//! Client address extraction from HTTP requests.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Fallback when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Determines the client address used for rate limiting.
///
/// When `behind_proxy` is set, forwarding headers are trusted in this order:
/// `cf-connecting-ip`, the first hop of `x-forwarded-for`, `x-real-ip`.
/// Otherwise, and when none of them is present, the socket peer address is
/// used. Returns [`UNKNOWN_CLIENT`] as a last resort.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(client_ip(&headers, None, true), "203.0.113.7");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip;
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("cf-connecting-ip")
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .or_else(|| header("x-real-ip"))
        .map(str::to_string)
}
