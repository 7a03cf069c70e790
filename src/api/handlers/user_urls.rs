//! Handlers for the caller's own URLs.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::user_urls::UserUrlItem;
use crate::api::middleware::owner::Owner;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the live URLs created by the caller.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response Codes
///
/// - **200 OK**: JSON array of `{ "short_url", "original_url" }`
/// - **204 No Content**: The caller owns no live URLs
/// - **401 Unauthorized**: No `X-User-Id` header
pub async fn list_user_urls_handler(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Response, AppError> {
    let owner_id = owner.require_established()?;

    let records = state.retrieval_service.list_user_urls(owner_id).await?;
    if records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<UserUrlItem> = records
        .into_iter()
        .map(|record| UserUrlItem {
            short_url: state.short_url(&record.short_code),
            original_url: record.original_url,
        })
        .collect();

    Ok(Json(items).into_response())
}

/// Queues soft deletion of the caller's short codes.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["aB3xY9", "Qw7Er2"]
/// ```
///
/// # Response Codes
///
/// - **202 Accepted**: Request queued; codes the caller does not own are skipped
/// - **401 Unauthorized**: No `X-User-Id` header
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    owner: Owner,
    Json(codes): Json<Vec<String>>,
) -> Result<StatusCode, AppError> {
    let owner_id = owner.require_established()?;

    state
        .deletion_service
        .submit_deletion(codes, owner_id)
        .await?;

    Ok(StatusCode::ACCEPTED)
}
