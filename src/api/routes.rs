//! API route configuration.

use crate::api::handlers::{
    delete_user_urls_handler, list_user_urls_handler, shorten_batch_handler,
    shorten_json_handler, stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`         - Shorten one URL (JSON)
/// - `POST   /shorten/batch`   - Shorten a batch of URLs
/// - `GET    /user/urls`       - List the caller's URLs
/// - `DELETE /user/urls`       - Queue deletion of the caller's URLs
/// - `GET    /internal/stats`  - Store statistics
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_json_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route(
            "/user/urls",
            get(list_user_urls_handler).delete(delete_user_urls_handler),
        )
        .route("/internal/stats", get(stats_handler))
}
