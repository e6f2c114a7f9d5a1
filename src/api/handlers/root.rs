//! Informational endpoints and the fallback.

use axum::{Json, http::StatusCode};
use serde_json::json;

use crate::api::dto::admin::MessageResponse;
use crate::error::AppError;

/// `GET /`
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "Welcome on the API root. POST /post-url with {\"long_url\": \"...\"} to shorten a link",
    ))
}

/// `GET /favicon.ico`
pub async fn favicon_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any unmatched method or path.
pub async fn fallback_handler() -> AppError {
    AppError::not_found("Invalid endpoint", json!({}))
}
