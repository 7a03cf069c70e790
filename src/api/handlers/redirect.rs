//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;
use tracing::debug;

use crate::domain::entities::Resolution;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Errors
///
/// - **404 Not Found**: No record was ever stored under the code
/// - **410 Gone**: The record was soft-deleted by its owner
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    match state.retrieval_service.resolve(&code).await? {
        Resolution::Active(url) => {
            debug!(code = %code, "Redirecting");
            Ok(Redirect::temporary(&url))
        }
        Resolution::Deleted(_) => Err(AppError::gone(
            "Short link has been deleted",
            json!({ "code": code }),
        )),
        Resolution::NotFound => Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        )),
    }
}
