//! Request extractors shared by the handlers.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Short id taken from the `{id}` path segment.
///
/// Rejects anything that does not match the configured id pattern before a
/// store call is made.
#[derive(Debug, Clone)]
pub struct ValidId(pub String);

impl FromRequestParts<AppState> for ValidId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| no_valid_id())?;

        if !state.id_matcher.is_valid(&id) {
            return Err(no_valid_id());
        }

        Ok(Self(id))
    }
}

fn no_valid_id() -> AppError {
    AppError::bad_request("No valid ID provided", json!({}))
}
