//! Handlers for privileged link management endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::info;

use crate::api::dto::admin::{MessageResponse, SyncResponse};
use crate::api::dto::pagination::{LinksResponse, ListQuery};
use crate::api::extract::ValidId;
use crate::application::services::VerificationStatus;
use crate::error::AppError;
use crate::state::AppState;

/// Lists stored links in key order.
///
/// # Endpoint
///
/// `GET /urls?count=<n>&cursor=<id>`
///
/// # Query Parameters
///
/// - `count`: page size, `1..=MAX_PAGE_SIZE` (default: `DEFAULT_PAGE_SIZE`)
/// - `cursor`: `next_cursor` of the previous page
///
/// # Response
///
/// ```json
/// {
///   "urls": [
///     {
///       "id": "1x9kz0q2m00000",
///       "long_url": "https://example.com/",
///       "post_date": "2026-01-01T00:00:00Z",
///       "is_verified": false
///     }
///   ],
///   "next_cursor": "1x9kz0q2m00000",
///   "has_more": true
/// }
/// ```
///
/// An empty store answers 200 with no items and a message.
///
/// # Errors
///
/// Returns 400 Bad Request for an invalid `count` or an unknown `cursor`.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<LinksResponse>, AppError> {
    let count = query.page_size(
        state.settings.default_page_size,
        state.settings.max_page_size,
    )?;

    let page = state.pagination_service.page(query.cursor(), count).await?;

    info!(
        "Returned {} link{} from /urls",
        page.items.len(),
        if page.items.len() == 1 { "" } else { "s" }
    );

    Ok(Json(LinksResponse::from(page)))
}

/// Marks a link as verified so its redirect becomes permanent.
///
/// # Endpoint
///
/// `PATCH /verify/{id}`
///
/// Verifying an already verified link is not an error.
///
/// # Errors
///
/// Returns 404 Not Found if no link is stored at the id.
/// Returns 503 Service Unavailable if the store cannot be read or patched.
pub async fn verify_link_handler(
    ValidId(id): ValidId,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    match state.verification_service.verify(&id).await {
        VerificationStatus::VerifiedNow => {
            Ok(Json(MessageResponse::new("Link verified successfully")))
        }
        VerificationStatus::AlreadyVerified => {
            Ok(Json(MessageResponse::new("Link already verified")))
        }
        VerificationStatus::NotFound => Err(AppError::not_found(
            "Link unavailable or not found",
            serde_json::json!({ "id": id }),
        )),
        VerificationStatus::Error => Err(AppError::upstream_unavailable(format!(
            "verification of {} failed",
            id
        ))),
    }
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /delete/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if no link is stored at the id.
/// Returns 503 Service Unavailable on store failure.
pub async fn delete_link_handler(
    ValidId(id): ValidId,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    state.link_service.delete(&id).await?;

    Ok(Json(MessageResponse::new("Link deleted")))
}

/// Recounts stored links and overwrites the cached counter.
///
/// # Endpoint
///
/// `PATCH /sync-counter`
///
/// # Response
///
/// ```json
/// { "message": "Counter synchronized successfully", "new_count": 42 }
/// ```
///
/// # Errors
///
/// Returns 503 Service Unavailable if the links cannot be counted or the
/// counter cannot be written.
pub async fn sync_counter_handler(
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, AppError> {
    let report = state.counter_service.resync().await;

    if !report.success {
        return Err(AppError::upstream_unavailable("counter resync failed"));
    }

    Ok(Json(SyncResponse {
        message: "Counter synchronized successfully".to_string(),
        new_count: report.actual_count,
    }))
}
