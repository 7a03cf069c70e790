//! Short code creation for single URLs and batches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::error::{ServiceError, require_owner};
use crate::domain::entities::PendingUrl;
use crate::domain::errors::{StorageError, with_deadline};
use crate::domain::repositories::UrlRepository;
use crate::utils::code_generator::generate_code;
use crate::utils::url_validator::validate_url;

/// Candidate codes tried before a collision is reported as a failure.
const MAX_ATTEMPTS: usize = 10;

/// Result of shortening one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenOutcome {
    pub code: String,
    /// True when the URL was already stored and `code` is its existing code.
    pub conflict: bool,
}

/// Service for shortening URLs.
///
/// Validates input, draws candidate codes and lets the backend decide
/// whether the URL is new. Already-stored URLs resolve to their existing
/// code regardless of who submitted them.
pub struct ShortenService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    code_length: usize,
    op_timeout: Duration,
}

impl<R: UrlRepository + ?Sized> ShortenService<R> {
    /// Creates a new shortening service.
    pub fn new(repository: Arc<R>, code_length: usize, op_timeout: Duration) -> Self {
        Self {
            repository,
            code_length,
            op_timeout,
        }
    }

    /// Shortens a single URL.
    ///
    /// The first submission of a URL stores it and returns
    /// `conflict == false`. Any later submission returns the same code with
    /// `conflict == true` and writes nothing.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] if the URL is not absolute or has no host
    /// - [`ServiceError::MissingOwner`] if `owner_id` is blank
    /// - [`ServiceError::Storage`] on backend failure, including
    ///   [`StorageError::CodeCollision`] once every attempt collided
    pub async fn shorten(&self, original_url: &str, owner_id: &str) -> Result<ShortenOutcome, ServiceError> {
        validate_url(original_url)?;
        require_owner(owner_id)?;

        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let candidate = generate_code(self.code_length);

            match with_deadline(
                self.op_timeout,
                self.repository.set(&candidate, original_url, owner_id),
            )
            .await
            {
                Ok(code) => {
                    let conflict = code != candidate;
                    tracing::debug!(code = %code, conflict, owner_id, "URL shortened");
                    return Ok(ShortenOutcome { code, conflict });
                }
                Err(e) if e.is_code_collision() => {
                    tracing::debug!(attempt, candidate = %candidate, "Short code collision, retrying");
                    last_err = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(exhausted(last_err))
    }

    /// Shortens a list of URLs in one atomic backend call.
    ///
    /// Every URL is validated before anything is stored. The result maps each
    /// input URL to its code; new and already-stored URLs are not told apart.
    ///
    /// # Errors
    ///
    /// See [`Self::shorten`]. A single invalid URL fails the whole batch.
    pub async fn shorten_batch(
        &self,
        original_urls: &[String],
        owner_id: &str,
    ) -> Result<HashMap<String, String>, ServiceError> {
        for url in original_urls {
            validate_url(url).map_err(|e| ServiceError::InvalidInput(format!("{url}: {e}")))?;
        }
        require_owner(owner_id)?;

        if original_urls.is_empty() {
            return Ok(HashMap::new());
        }

        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let entries: Vec<PendingUrl> = original_urls
                .iter()
                .map(|url| PendingUrl::new(generate_code(self.code_length), url.as_str()))
                .collect();

            match with_deadline(self.op_timeout, self.repository.batch_set(entries, owner_id)).await {
                Ok(resolved) => {
                    tracing::debug!(urls = resolved.len(), owner_id, "URL batch shortened");
                    return Ok(resolved);
                }
                Err(e) if e.is_code_collision() => {
                    tracing::debug!(attempt, "Short code collision in batch, retrying");
                    last_err = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(exhausted(last_err))
    }
}

fn exhausted(last_err: Option<StorageError>) -> ServiceError {
    tracing::error!(attempts = MAX_ATTEMPTS, "Failed to find a free short code");
    last_err
        .unwrap_or_else(|| StorageError::Unavailable("no short code attempts made".to_string()))
        .into()
}
