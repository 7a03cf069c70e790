//! Short code resolution, per-owner listings and store statistics.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::error::ServiceError;
use crate::domain::entities::{Resolution, StoreStats, UrlRecord};
use crate::domain::errors::with_deadline;
use crate::domain::repositories::UrlRepository;

/// Read-side service over a URL repository.
///
/// Every call is bounded by the configured operation timeout.
pub struct RetrievalService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    op_timeout: Duration,
}

impl<R: UrlRepository + ?Sized> RetrievalService<R> {
    pub fn new(repository: Arc<R>, op_timeout: Duration) -> Self {
        Self {
            repository,
            op_timeout,
        }
    }

    /// Looks up a short code.
    ///
    /// Deleted records are reported as [`Resolution::Deleted`] so callers can
    /// answer "gone" rather than "missing".
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Storage`] on backend failure or timeout.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, ServiceError> {
        Ok(with_deadline(self.op_timeout, self.repository.get(code)).await?)
    }

    /// Two-state view of [`Self::resolve`]: the URL of a live record or `None`.
    pub async fn resolve_active(&self, code: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.resolve(code).await?.into_active())
    }

    /// Returns the live records created by `owner_id`.
    pub async fn list_user_urls(&self, owner_id: &str) -> Result<Vec<UrlRecord>, ServiceError> {
        Ok(with_deadline(self.op_timeout, self.repository.get_user_records(owner_id)).await?)
    }

    /// Distinct owners and stored records, deleted records included.
    pub async fn stats(&self) -> Result<StoreStats, ServiceError> {
        Ok(with_deadline(self.op_timeout, self.repository.get_stats()).await?)
    }

    /// Checks that the backend is reachable within the operation timeout.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(with_deadline(self.op_timeout, self.repository.ping()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::StorageError;
    use crate::domain::repositories::MockUrlRepository;

    fn service(repo: MockUrlRepository) -> RetrievalService<MockUrlRepository> {
        RetrievalService::new(Arc::new(repo), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_resolve_three_states() {
        let mut repo = MockUrlRepository::new();
        repo.expect_get().returning(|code| {
            Ok(match code {
                "live01" => Resolution::Active("http://a.com".into()),
                "gone01" => Resolution::Deleted("http://b.com".into()),
                _ => Resolution::NotFound,
            })
        });
        let service = service(repo);

        let live = service.resolve("live01").await.unwrap();
        assert_eq!((live.original_url(), live.found(), live.is_deleted()), (Some("http://a.com"), true, false));

        let gone = service.resolve("gone01").await.unwrap();
        assert_eq!((gone.original_url(), gone.found(), gone.is_deleted()), (Some("http://b.com"), true, true));

        let missing = service.resolve("nope00").await.unwrap();
        assert_eq!((missing.original_url(), missing.found(), missing.is_deleted()), (None, false, false));
    }

    #[tokio::test]
    async fn test_resolve_active_hides_deleted() {
        let mut repo = MockUrlRepository::new();
        repo.expect_get()
            .returning(|_| Ok(Resolution::Deleted("http://b.com".into())));

        assert_eq!(service(repo).resolve_active("gone01").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_times_out() {
        let slow = RetrievalService::new(Arc::new(SlowRepository), Duration::from_millis(100));

        let err = slow.resolve("abc123").await.unwrap_err();

        assert!(matches!(err, ServiceError::Storage(StorageError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_list_user_urls_passes_through() {
        let mut repo = MockUrlRepository::new();
        repo.expect_get_user_records()
            .withf(|owner| owner == "u1")
            .times(1)
            .returning(|owner| {
                Ok(vec![UrlRecord::new(
                    "abc123".into(),
                    "http://a.com".into(),
                    owner.to_string(),
                )])
            });

        let records = service(repo).list_user_urls("u1").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner_id, "u1");
    }

    #[tokio::test]
    async fn test_stats_and_ping() {
        let mut repo = MockUrlRepository::new();
        repo.expect_get_stats()
            .returning(|| Ok(StoreStats { users: 3, urls: 7 }));
        repo.expect_ping()
            .returning(|| Err(StorageError::Unavailable("refused".into())));
        let service = service(repo);

        assert_eq!(service.stats().await.unwrap(), StoreStats { users: 3, urls: 7 });
        assert!(matches!(
            service.ping().await,
            Err(ServiceError::Storage(StorageError::Unavailable(_)))
        ));
    }

    struct SlowRepository;

    #[async_trait::async_trait]
    impl UrlRepository for SlowRepository {
        async fn get(&self, _code: &str) -> Result<Resolution, StorageError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Resolution::NotFound)
        }

        async fn set(&self, code: &str, _: &str, _: &str) -> Result<String, StorageError> {
            Ok(code.to_string())
        }

        async fn batch_set(
            &self,
            _: Vec<crate::domain::entities::PendingUrl>,
            _: &str,
        ) -> Result<std::collections::HashMap<String, String>, StorageError> {
            Ok(Default::default())
        }

        async fn batch_delete(&self, _: &[String], _: &str) -> Result<u64, StorageError> {
            Ok(0)
        }

        async fn get_user_records(&self, _: &str) -> Result<Vec<UrlRecord>, StorageError> {
            Ok(Vec::new())
        }

        async fn get_stats(&self) -> Result<StoreStats, StorageError> {
            Ok(StoreStats::default())
        }

        async fn ping(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }
}
