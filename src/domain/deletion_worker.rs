//! Bounded deletion queue and the fixed worker pool that drains it.
//!
//! Producers push [`DeletionTask`]s onto a bounded channel and wait when it
//! is full. A fixed number of workers share the receiving end, so each task
//! is taken by exactly one worker. Workers apply tasks through
//! [`UrlRepository::batch_delete`] independently and in no particular order.
//!
//! Failed tasks are logged and dropped without retry. On shutdown every
//! worker finishes its in-flight task and exits; whatever is still queued
//! is discarded once the last worker is gone.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::deletion_task::{DeletionOutcome, DeletionTask};
use crate::domain::errors::{StorageError, with_deadline};
use crate::domain::repositories::UrlRepository;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default number of workers.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Sizing and timing of the deletion pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub queue_capacity: usize,
    pub workers: usize,
    /// Deadline applied to each `batch_delete` call.
    pub op_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            workers: DEFAULT_WORKER_COUNT,
            op_timeout: Duration::from_secs(5),
        }
    }
}

/// Returned by [`DeletionPipeline::enqueue`] once every worker has exited.
#[derive(Debug, thiserror::Error)]
#[error("deletion pipeline is shut down")]
pub struct PipelineClosed(pub DeletionTask);

type SharedReceiver = Arc<Mutex<mpsc::Receiver<DeletionTask>>>;

/// Producer handle onto the deletion queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DeletionPipeline {
    sender: mpsc::Sender<DeletionTask>,
}

impl DeletionPipeline {
    /// Creates the queue and spawns the worker pool.
    ///
    /// Workers stop when `shutdown` observes `true` or its sender is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `settings.queue_capacity` is zero (tokio channel invariant).
    pub fn start<R>(
        repository: Arc<R>,
        settings: PipelineSettings,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, DeletionWorkers)
    where
        R: UrlRepository + ?Sized + 'static,
    {
        let (sender, receiver) = mpsc::channel(settings.queue_capacity);
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));

        let mut tasks = JoinSet::new();
        for worker_id in 0..settings.workers {
            tasks.spawn(run_deletion_worker(
                worker_id,
                receiver.clone(),
                repository.clone(),
                settings.op_timeout,
                shutdown.clone(),
            ));
        }

        info!(
            workers = settings.workers,
            queue_capacity = settings.queue_capacity,
            "Deletion pipeline started"
        );

        (Self { sender }, DeletionWorkers { tasks })
    }

    /// Queues a task, waiting for free space while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineClosed`] with the task if the workers are gone.
    pub async fn enqueue(&self, task: DeletionTask) -> Result<(), PipelineClosed> {
        self.sender
            .send(task)
            .await
            .map_err(|mpsc::error::SendError(task)| PipelineClosed(task))
    }

    /// True once the queue no longer accepts tasks.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Number of free slots in the queue.
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

/// Handles to the spawned workers.
#[derive(Debug)]
pub struct DeletionWorkers {
    tasks: JoinSet<()>,
}

impl DeletionWorkers {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every worker to exit.
    pub async fn join(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Deletion worker terminated abnormally");
            }
        }
        info!("Deletion pipeline stopped");
    }
}

/// Applies one task against the repository.
///
/// # Errors
///
/// Propagates the backend error, including [`StorageError::Timeout`] when
/// `op_timeout` elapses.
pub async fn apply_deletion<R>(
    repository: &R,
    task: &DeletionTask,
    op_timeout: Duration,
) -> Result<DeletionOutcome, StorageError>
where
    R: UrlRepository + ?Sized,
{
    let matched = with_deadline(
        op_timeout,
        repository.batch_delete(&task.codes, &task.owner_id),
    )
    .await?;

    Ok(DeletionOutcome::from_counts(task.len(), matched))
}

async fn run_deletion_worker<R>(
    worker_id: usize,
    receiver: SharedReceiver,
    repository: Arc<R>,
    op_timeout: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    R: UrlRepository + ?Sized,
{
    debug!(worker_id, "Deletion worker started");

    loop {
        let task = tokio::select! {
            biased;
            _ = stop_requested(&mut shutdown) => break,
            task = next_task(&receiver) => match task {
                Some(task) => task,
                None => break,
            },
        };

        debug!(worker_id, codes = task.len(), owner_id = %task.owner_id, "Deletion task dequeued");

        match apply_deletion(repository.as_ref(), &task, op_timeout).await {
            Ok(DeletionOutcome::Applied) => {
                info!(worker_id, codes = task.len(), "Deletion task applied");
            }
            Ok(DeletionOutcome::AppliedPartial { skipped }) => {
                info!(
                    worker_id,
                    codes = task.len(),
                    skipped,
                    "Deletion task applied partially"
                );
            }
            Err(e) => {
                // Dropped on purpose: the submitter has already returned.
                warn!(
                    worker_id,
                    codes = task.len(),
                    owner_id = %task.owner_id,
                    error = %e,
                    "Deletion task failed"
                );
            }
        }
    }

    debug!(worker_id, "Deletion worker stopping");
}

async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender also counts as a stop request.
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn next_task(receiver: &Mutex<mpsc::Receiver<DeletionTask>>) -> Option<DeletionTask> {
    receiver.lock().await.recv().await
}
