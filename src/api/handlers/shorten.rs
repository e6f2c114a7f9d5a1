//! Handler for link creation endpoint.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{BodyShape, MAX_BODY_BYTES, ShortenResponse, check_body_shape};
use crate::api::middleware::rate_limit::ClientFingerprint;
use crate::application::services::CreateOutcome;
use crate::error::AppError;
use crate::state::{ApiSettings, AppState};

/// Creates the short link for one long URL.
///
/// # Endpoint
///
/// `POST /post-url`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/some/page" }
/// ```
///
/// `Content-Type` must be `application/json` and the body at most 10 000 bytes.
/// No other field is accepted.
///
/// # Response
///
/// ```json
/// {
///   "id": "1x9kz0q2m00000",
///   "short_url": "https://s.example.com/url/1x9kz0q2m00000",
///   "long_url": "https://example.com/some/page"
/// }
/// ```
///
/// - **201 Created**: a new link was stored
/// - **200 OK**: the URL was already stored under the same id
///
/// # Errors
///
/// - 400 for a malformed body or a rejected URL
/// - 409 when another URL already owns the id
/// - 429 when the daily write quota is used up
/// - 507 when the store is full
/// - 503 when the store or the ledger is unavailable
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(ClientFingerprint(fingerprint)): Extension<ClientFingerprint>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    if !declares_json(&headers) || declared_length(&headers) > MAX_BODY_BYTES {
        return Err(invalid_body());
    }

    // Over-limit or unreadable bodies are answered like malformed ones.
    let body = body.map_err(|_| invalid_body())?;

    let request = match check_body_shape(&body) {
        BodyShape::Valid(request) => request,
        BodyShape::Malformed => return Err(invalid_body()),
        BodyShape::UnexpectedFields(fields) => {
            return Err(AppError::bad_request(
                "The body contains an unexpected field",
                json!({ "fields": fields }),
            ));
        }
    };

    request.validate()?;

    let host = request_host(&headers);
    let own_hosts = own_hosts(&state.settings, host);

    let outcome = state
        .link_service
        .create(&request.long_url, &fingerprint, &own_hosts)
        .await?;

    let status = match outcome {
        CreateOutcome::Created(_) => StatusCode::CREATED,
        CreateOutcome::Reused(_) => StatusCode::OK,
    };

    let link = outcome.link();
    let short_url = format!(
        "{}/url/{}",
        public_origin(&state.settings, &headers, host),
        link.id
    );

    Ok((
        status,
        Json(ShortenResponse {
            id: link.id.clone(),
            short_url,
            long_url: link.long_url.clone(),
        }),
    ))
}

fn invalid_body() -> AppError {
    AppError::bad_request("Invalid POST body", json!({}))
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("application/json"))
}

fn declared_length(headers: &HeaderMap) -> usize {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn request_host(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Hosts this service is reached on: the request `Host` and the public base URL host.
fn own_hosts(settings: &ApiSettings, host: Option<&str>) -> Vec<String> {
    let public_host = settings
        .public_base_url
        .as_deref()
        .and_then(|base| url::Url::parse(base).ok())
        .and_then(|base| base.host_str().map(str::to_string));

    host.map(str::to_string).into_iter().chain(public_host).collect()
}

/// Origin prefixed to returned short links.
///
/// `PUBLIC_BASE_URL` wins. Otherwise the origin is rebuilt from `Host`, with
/// the scheme from `X-Forwarded-Proto` behind a proxy. Without either, links
/// are returned relative.
fn public_origin(settings: &ApiSettings, headers: &HeaderMap, host: Option<&str>) -> String {
    if let Some(base) = &settings.public_base_url {
        return base.clone();
    }

    let Some(host) = host else {
        return String::new();
    };

    let scheme = settings
        .behind_proxy
        .then(|| headers.get("x-forwarded-proto"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or("http");

    format!("{}://{}", scheme, host)
}
