//! Handler for store statistics.

use axum::{Json, extract::State};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the number of stored URLs and distinct owners.
///
/// # Endpoint
///
/// `GET /api/internal/stats`
///
/// # Response
///
/// ```json
/// { "urls": 42, "users": 7 }
/// ```
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.retrieval_service.stats().await?;
    Ok(Json(stats.into()))
}
