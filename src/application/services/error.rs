//! Errors returned by the application services.

use thiserror::Error;

use crate::domain::errors::StorageError;
use crate::utils::url_validator::UrlValidationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input; never reaches storage.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A write was attempted without a caller identity.
    #[error("owner identity is required")]
    MissingOwner,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<UrlValidationError> for ServiceError {
    fn from(e: UrlValidationError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

/// Rejects blank owner ids.
pub(crate) fn require_owner(owner_id: &str) -> Result<(), ServiceError> {
    if owner_id.trim().is_empty() {
        return Err(ServiceError::MissingOwner);
    }
    Ok(())
}
