//! URL normalization and target validation.
//!
//! A normalized URL is the input for short id hashing, so two spellings of the
//! same address must normalize to the same string.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Host is not a public domain name")]
    InvalidHost,
}

const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "[::1]"];

/// Normalizes a URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is trimmed
/// 2. **Protocol**: Only HTTP and HTTPS are allowed; the scheme is kept
/// 3. **Hostname**: Lowercased; must contain a dot, must not end with a dot,
///    must not be a loopback alias
/// 4. **Default ports**: Removed (80 for HTTP, 443 for HTTPS)
/// 5. **Path, query and fragment**: Preserved as-is
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
/// Returns [`UrlNormalizationError::InvalidHost`] for rejected hosts.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTP://Example.COM/Path").unwrap(),
///     "http://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let url = Url::parse(input.trim())
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    // The parser already lowercases hosts of special schemes and drops default ports.
    let host = url
        .host_str()
        .ok_or(UrlNormalizationError::InvalidHost)?
        .to_ascii_lowercase();

    if !host.contains('.') || host.ends_with('.') || LOOPBACK_HOSTS.contains(&host.as_str()) {
        return Err(UrlNormalizationError::InvalidHost);
    }

    Ok(url.to_string())
}

/// Returns true if `://<own_host>` appears anywhere in `normalized_url`.
///
/// This catches links to this service both as the target and embedded in a
/// path or query (`https://a.example/?next=https://own.host/url/x`).
/// `own_host` is a `Host` header value and may carry a port; it matches with
/// and without it. Comparison is ASCII case-insensitive.
pub fn embeds_host(normalized_url: &str, own_host: &str) -> bool {
    let own_host = own_host.trim().to_ascii_lowercase();
    if own_host.is_empty() {
        return false;
    }

    let haystack = normalized_url.to_ascii_lowercase();
    let bare = strip_port(&own_host);

    haystack.contains(&format!("://{}", own_host)) || haystack.contains(&format!("://{}", bare))
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split(':').next().unwrap_or(host)
}
