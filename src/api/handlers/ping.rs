//! Handler for storage liveness checks.

use axum::{extract::State, http::StatusCode};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// `GET /ping`: **200 OK** when the storage backend answers in time.
pub async fn ping_handler(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.retrieval_service.ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Storage ping failed");
        AppError::internal("Storage is unavailable", json!({}))
    })?;

    Ok(StatusCode::OK)
}
