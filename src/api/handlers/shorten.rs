//! Handlers for URL shortening.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::batch::{BatchShortenItem, BatchShortenResult};
use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::owner::Owner;
use crate::application::services::ShortenOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// `201 Created` for a new URL, `409 Conflict` for an already-stored one.
fn outcome_status(outcome: &ShortenOutcome) -> StatusCode {
    if outcome.conflict {
        StatusCode::CONFLICT
    } else {
        StatusCode::CREATED
    }
}

/// Shortens a URL sent as the plain-text request body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response Codes
///
/// - **201 Created**: New short URL in the body
/// - **409 Conflict**: URL already stored; the existing short URL is in the body
/// - **400 Bad Request**: Body is not an absolute URL
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    owner: Owner,
    body: String,
) -> Result<(StatusCode, String), AppError> {
    let outcome = state
        .shorten_service
        .shorten(body.trim(), owner.id())
        .await?;

    Ok((outcome_status(&outcome), state.short_url(&outcome.code)))
}

/// Shortens a URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/aB3xY9" }
/// ```
///
/// Status codes as for [`shorten_text_handler`].
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    owner: Owner,
    Json(req): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let outcome = state
        .shorten_service
        .shorten(req.url.trim(), owner.id())
        .await?;

    let response = ShortenResponse {
        result: state.short_url(&outcome.code),
    };

    Ok((outcome_status(&outcome), Json(response)))
}

/// Shortens a batch of URLs in one atomic operation.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "1", "original_url": "https://a.example.com" },
///   { "correlation_id": "2", "original_url": "https://b.example.com" }
/// ]
/// ```
///
/// # Response
///
/// Always **201 Created** on success, whether or not some URLs were already
/// stored. One invalid URL fails the whole batch with **400**.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    owner: Owner,
    Json(items): Json<Vec<BatchShortenItem>>,
) -> Result<(StatusCode, Json<Vec<BatchShortenResult>>), AppError> {
    let urls: Vec<String> = items
        .iter()
        .map(|item| item.original_url.trim().to_string())
        .collect();

    let resolved = state
        .shorten_service
        .shorten_batch(&urls, owner.id())
        .await?;

    let mut results = Vec::with_capacity(items.len());
    for (item, url) in items.into_iter().zip(&urls) {
        let code = resolved.get(url).ok_or_else(|| {
            AppError::internal(
                "Batch result is missing a URL",
                serde_json::json!({ "correlation_id": item.correlation_id }),
            )
        })?;
        results.push(BatchShortenResult {
            correlation_id: item.correlation_id,
            short_url: state.short_url(code),
        });
    }

    Ok((StatusCode::CREATED, Json(results)))
}
