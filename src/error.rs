//! Application error type and its HTTP mapping.
//!
//! Every downstream failure is converted into one of these kinds at the
//! boundary of the component that observed it. Raw store or ledger errors
//! never reach a client: [`AppError::UpstreamUnavailable`] and
//! [`AppError::Internal`] answer with a fixed message and log the detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::infrastructure::ledger::LedgerError;
use crate::infrastructure::store::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serialized error payload: `{"code", "message", "details"}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    RateLimited { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    CapacityExceeded { message: String, details: Value },

    #[error("{message}")]
    UpstreamUnavailable { message: String, details: Value },

    #[error("{message}")]
    GenerationFailed { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn rate_limited(message: impl Into<String>, details: Value) -> Self {
        Self::RateLimited {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn capacity_exceeded(message: impl Into<String>, details: Value) -> Self {
        Self::CapacityExceeded {
            message: message.into(),
            details,
        }
    }

    /// Transient backend failure. `reason` is logged, never returned.
    pub fn upstream_unavailable(reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: "Service unavailable".to_string(),
            details: json!({ "reason": reason.into() }),
        }
    }

    /// A new link could not be persisted. The message is returned, the details are not.
    pub fn generation_failed(details: Value) -> Self {
        Self::GenerationFailed {
            message: "Link could not be generated".to_string(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status and machine-readable code for this error kind.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::CapacityExceeded { .. } => {
                (StatusCode::INSUFFICIENT_STORAGE, "capacity_exceeded")
            }
            AppError::UpstreamUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            AppError::GenerationFailed { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "link_not_generated")
            }
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converts the error into its client-facing payload.
    ///
    /// Upstream, generation and internal details are replaced with an empty object.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();

        let (message, details) = match self {
            AppError::UpstreamUnavailable { message, .. }
            | AppError::GenerationFailed { message, .. } => (message.clone(), json!({})),
            AppError::Internal { .. } => ("Internal server error".to_string(), json!({})),
            AppError::Validation { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::RateLimited { message, details }
            | AppError::Conflict { message, details }
            | AppError::NotFound { message, details }
            | AppError::CapacityExceeded { message, details } => {
                (message.clone(), details.clone())
            }
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        match &self {
            AppError::Internal { message, details }
            | AppError::GenerationFailed { message, details } => {
                tracing::error!(%message, %details, "Internal error");
            }
            AppError::UpstreamUnavailable { details, .. } => {
                tracing::warn!(%details, "Upstream unavailable");
            }
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "Store call failed");
        AppError::upstream_unavailable(e.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        tracing::error!(error = %e, "Ledger call failed");
        AppError::upstream_unavailable(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        AppError::bad_request("Invalid POST body", json!({ "fields": fields }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = AppError::internal("disk on fire", json!({ "path": "/secret" }));
        let info = err.to_error_info();

        assert_eq!(info.code, "internal_error");
        assert_eq!(info.message, "Internal server error");
        assert_eq!(info.details, json!({}));
    }

    #[test]
    fn test_upstream_reason_is_not_exposed() {
        let err = AppError::upstream_unavailable("connection refused on 10.0.0.4");
        let info = err.to_error_info();

        assert_eq!(info.code, "service_unavailable");
        assert_eq!(info.details, json!({}));
        assert!(!info.message.contains("10.0.0.4"));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::bad_request("x", json!({})), 400),
            (AppError::unauthorized("x", json!({})), 401),
            (AppError::not_found("x", json!({})), 404),
            (AppError::conflict("x", json!({})), 409),
            (AppError::rate_limited("x", json!({})), 429),
            (AppError::internal("x", json!({})), 500),
            (AppError::generation_failed(json!({})), 500),
            (AppError::upstream_unavailable("x"), 503),
            (AppError::capacity_exceeded("x", json!({})), 507),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_and_code().0.as_u16(), expected);
        }
    }

    #[test]
    fn test_rate_limited_keeps_details() {
        let err = AppError::rate_limited("Slow down", json!({ "interval_seconds": 1 }));
        let info = err.to_error_info();

        assert_eq!(info.details["interval_seconds"], 1);
        assert_eq!(err.to_string(), "Slow down");
    }

    #[test]
    fn test_validation_errors_name_fields() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("long_url", validator::ValidationError::new("blank"));

        let err: AppError = errors.into();

        match err {
            AppError::Validation { message, details } => {
                assert_eq!(message, "Invalid POST body");
                assert_eq!(details, json!({ "fields": ["long_url"] }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_store_error_maps_to_upstream() {
        let err: AppError = StoreError::Timeout.into();
        assert!(matches!(err, AppError::UpstreamUnavailable { .. }));
    }
}
