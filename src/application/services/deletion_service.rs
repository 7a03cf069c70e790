//! Submission side of asynchronous soft deletion.

use crate::application::services::error::{ServiceError, require_owner};
use crate::domain::deletion_task::DeletionTask;
use crate::domain::deletion_worker::{DeletionPipeline, PipelineClosed};

/// Hands deletion requests to the background pipeline.
///
/// Submission returns as soon as the task is queued. Whether the records
/// were actually deleted is never reported back; failures are only logged
/// by the worker that picked the task up.
#[derive(Debug, Clone)]
pub struct DeletionService {
    pipeline: DeletionPipeline,
}

impl DeletionService {
    pub fn new(pipeline: DeletionPipeline) -> Self {
        Self { pipeline }
    }

    /// Queues soft deletion of `codes` on behalf of `owner_id`.
    ///
    /// Waits while the queue is full. Empty code lists are ignored. If the
    /// pipeline has already shut down the task is logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MissingOwner`] if `owner_id` is blank.
    pub async fn submit_deletion(&self, codes: Vec<String>, owner_id: &str) -> Result<(), ServiceError> {
        require_owner(owner_id)?;

        if codes.is_empty() {
            tracing::debug!(owner_id, "Ignoring empty deletion request");
            return Ok(());
        }

        let task = DeletionTask::new(codes, owner_id);
        let count = task.len();

        match self.pipeline.enqueue(task).await {
            Ok(()) => {
                tracing::debug!(owner_id, codes = count, "Deletion task queued");
            }
            Err(PipelineClosed(task)) => {
                tracing::warn!(
                    owner_id = %task.owner_id,
                    codes = task.len(),
                    "Deletion pipeline is shut down, dropping task"
                );
            }
        }

        Ok(())
    }

    pub fn pipeline(&self) -> &DeletionPipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deletion_worker::PipelineSettings;
    use crate::domain::entities::Resolution;
    use crate::domain::repositories::{MockUrlRepository, UrlRepository};
    use crate::infrastructure::persistence::MemoryUrlRepository;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    #[tokio::test]
    async fn test_submit_requires_owner() {
        let mut repo = MockUrlRepository::new();
        repo.expect_batch_delete().times(0);
        let (_stop_tx, stop_rx) = watch::channel(false);
        let (pipeline, _workers) =
            DeletionPipeline::start(Arc::new(repo), PipelineSettings::default(), stop_rx);

        let err = DeletionService::new(pipeline)
            .submit_deletion(vec!["abc123".into()], "")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::MissingOwner));
    }

    #[tokio::test]
    async fn test_submit_empty_list_queues_nothing() {
        let mut repo = MockUrlRepository::new();
        repo.expect_batch_delete().times(0);
        let (_stop_tx, stop_rx) = watch::channel(false);
        let (pipeline, _workers) =
            DeletionPipeline::start(Arc::new(repo), PipelineSettings::default(), stop_rx);
        let service = DeletionService::new(pipeline);

        service.submit_deletion(Vec::new(), "u1").await.unwrap();

        assert_eq!(service.pipeline().available(), service.pipeline().max_capacity());
    }

    #[tokio::test]
    async fn test_submit_is_applied_by_workers() {
        let repo = Arc::new(MemoryUrlRepository::new());
        repo.set("abc123", "http://a.com", "u1").await.unwrap();
        let (stop_tx, stop_rx) = watch::channel(false);
        let (pipeline, workers) =
            DeletionPipeline::start(Arc::clone(&repo), PipelineSettings::default(), stop_rx);
        let service = DeletionService::new(pipeline);

        service.submit_deletion(vec!["abc123".into()], "u1").await.unwrap();

        for _ in 0..200 {
            if repo.get("abc123").await.unwrap().is_deleted() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(repo.get("abc123").await.unwrap(), Resolution::Deleted("http://a.com".into()));

        stop_tx.send(true).unwrap();
        workers.join().await;
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_dropped_silently() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (pipeline, workers) = DeletionPipeline::start(
            Arc::new(MemoryUrlRepository::new()),
            PipelineSettings::default(),
            stop_rx,
        );
        stop_tx.send(true).unwrap();
        workers.join().await;

        let service = DeletionService::new(pipeline);
        assert!(service.pipeline().is_closed());
        assert!(service.submit_deletion(vec!["abc123".into()], "u1").await.is_ok());
    }
}
