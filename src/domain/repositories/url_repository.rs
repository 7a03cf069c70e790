//! Repository trait for URL record storage.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::entities::{PendingUrl, Resolution, StoreStats, UrlRecord};
use crate::domain::errors::StorageError;

/// Storage contract satisfied by every backend.
///
/// Original URLs are unique across the whole store, deleted records
/// included, so resubmitting a URL always resolves to the code it was first
/// stored under. Short codes are never reused.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - process memory
/// - [`crate::infrastructure::persistence::FileUrlRepository`] - append-only JSON lines file
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
/// - Test mocks available with `cfg(test)`
///
/// Dropping any returned future cancels the operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Looks up a short code.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on backend failure. An unknown code is
    /// [`Resolution::NotFound`], not an error.
    async fn get(&self, code: &str) -> Result<Resolution, StorageError>;

    /// Stores `original_url` under `code` unless the URL is already stored.
    ///
    /// Returns the code the URL is stored under. When it differs from `code`
    /// the URL already existed and nothing was written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CodeCollision`] if `code` is taken by a
    /// different URL, and other [`StorageError`]s on backend failure.
    async fn set(&self, code: &str, original_url: &str, owner_id: &str)
    -> Result<String, StorageError>;

    /// Stores a batch atomically with the same conflict rules as [`Self::set`].
    ///
    /// Returns a map from every input URL to its stored code. Either every
    /// new record in the batch becomes visible or none does.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CodeCollision`] if any candidate code is taken,
    /// and other [`StorageError`]s on backend failure.
    async fn batch_set(
        &self,
        entries: Vec<PendingUrl>,
        owner_id: &str,
    ) -> Result<HashMap<String, String>, StorageError>;

    /// Soft-deletes every record in `codes` owned by `owner_id`.
    ///
    /// Unknown codes and codes owned by someone else are skipped silently.
    /// Returns how many owned records matched.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on backend failure.
    async fn batch_delete(&self, codes: &[String], owner_id: &str) -> Result<u64, StorageError>;

    /// Returns the non-deleted records owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on backend failure.
    async fn get_user_records(&self, owner_id: &str) -> Result<Vec<UrlRecord>, StorageError>;

    /// Counts distinct owners and stored records, deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on backend failure.
    async fn get_stats(&self) -> Result<StoreStats, StorageError>;

    /// Checks backend liveness.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be reached.
    async fn ping(&self) -> Result<(), StorageError>;
}
