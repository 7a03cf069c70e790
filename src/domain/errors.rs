//! Storage-layer error taxonomy shared by every backend.

use std::time::Duration;

use thiserror::Error;

/// Failure reported by a [`crate::domain::repositories::UrlRepository`] backend.
///
/// Callers must not assume any durable effect happened when one of these is
/// returned.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// The candidate short code is already stored for a different URL.
    #[error("short code {0} is already taken")]
    CodeCollision(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Returns true when retrying with a fresh short code may succeed.
    pub fn is_code_collision(&self) -> bool {
        matches!(self, Self::CodeCollision(_))
    }
}

/// Runs a backend future under a deadline.
///
/// Dropping the returned future cancels the backend call. When `limit`
/// elapses first the call is abandoned and [`StorageError::Timeout`] is
/// returned.
pub async fn with_deadline<T, F>(limit: Duration, fut: F) -> Result<T, StorageError>
where
    F: std::future::Future<Output = Result<T, StorageError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(limit)),
    }
}
