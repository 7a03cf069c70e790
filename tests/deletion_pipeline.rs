use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use url_shortener::application::services::{DeletionService, RetrievalService, ShortenService};
use url_shortener::domain::deletion_worker::{DeletionPipeline, DeletionWorkers, PipelineSettings};
use url_shortener::domain::entities::Resolution;
use url_shortener::domain::repositories::UrlRepository;
use url_shortener::infrastructure::persistence::{FileUrlRepository, MemoryUrlRepository};

const TIMEOUT: Duration = Duration::from_secs(5);

struct Engine {
    shorten: ShortenService<dyn UrlRepository>,
    retrieval: RetrievalService<dyn UrlRepository>,
    deletion: DeletionService,
    stop: watch::Sender<bool>,
    workers: DeletionWorkers,
}

impl Engine {
    fn start(repository: Arc<dyn UrlRepository>, settings: PipelineSettings) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        let (pipeline, workers) = DeletionPipeline::start(repository.clone(), settings, stop_rx);

        Self {
            shorten: ShortenService::new(repository.clone(), 6, TIMEOUT),
            retrieval: RetrievalService::new(repository, TIMEOUT),
            deletion: DeletionService::new(pipeline),
            stop,
            workers,
        }
    }

    async fn wait_for(&self, code: &str, expected: &Resolution) -> Resolution {
        for _ in 0..300 {
            let resolution = self.retrieval.resolve(code).await.unwrap();
            if &resolution == expected {
                return resolution;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.retrieval.resolve(code).await.unwrap()
    }

    async fn stop(self) {
        let _ = self.stop.send(true);
        self.workers.join().await;
    }
}

#[tokio::test]
async fn test_create_conflict_resolve_delete_scenario() {
    let engine = Engine::start(Arc::new(MemoryUrlRepository::new()), PipelineSettings::default());

    let first = engine.shorten.shorten("http://example.com", "u1").await.unwrap();
    assert!(!first.conflict);

    let second = engine.shorten.shorten("http://example.com", "u2").await.unwrap();
    assert!(second.conflict);
    assert_eq!(second.code, first.code);

    let resolved = engine.retrieval.resolve(&first.code).await.unwrap();
    assert_eq!(
        (resolved.original_url(), resolved.found(), resolved.is_deleted()),
        (Some("http://example.com"), true, false)
    );

    engine
        .deletion
        .submit_deletion(vec![first.code.clone()], "u1")
        .await
        .unwrap();

    let deleted = Resolution::Deleted("http://example.com".into());
    let resolved = engine.wait_for(&first.code, &deleted).await;
    assert_eq!(
        (resolved.original_url(), resolved.found(), resolved.is_deleted()),
        (Some("http://example.com"), true, true)
    );

    engine.stop().await;
}

#[tokio::test]
async fn test_deletion_by_other_owner_leaves_record_live() {
    let engine = Engine::start(Arc::new(MemoryUrlRepository::new()), PipelineSettings::default());
    let created = engine.shorten.shorten("http://example.com", "u1").await.unwrap();
    let marker = engine.shorten.shorten("http://marker.com", "u2").await.unwrap();

    engine
        .deletion
        .submit_deletion(vec![created.code.clone(), marker.code.clone()], "u2")
        .await
        .unwrap();

    // Both codes travel in one task, so once the marker is deleted the task
    // has been applied in full.
    let marker_deleted = Resolution::Deleted("http://marker.com".into());
    assert_eq!(engine.wait_for(&marker.code, &marker_deleted).await, marker_deleted);
    assert_eq!(
        engine.retrieval.resolve(&created.code).await.unwrap(),
        Resolution::Active("http://example.com".into())
    );

    engine.stop().await;
}

#[tokio::test]
async fn test_deleted_code_is_never_reported_missing() {
    let engine = Engine::start(Arc::new(MemoryUrlRepository::new()), PipelineSettings::default());
    let created = engine.shorten.shorten("http://example.com", "u1").await.unwrap();

    engine
        .deletion
        .submit_deletion(vec![created.code.clone()], "u1")
        .await
        .unwrap();

    for _ in 0..50 {
        assert!(engine.retrieval.resolve(&created.code).await.unwrap().found());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    engine.stop().await;
}

#[tokio::test]
async fn test_batch_with_invalid_url_assigns_nothing() {
    let repository = Arc::new(MemoryUrlRepository::new());
    let engine = Engine::start(repository.clone(), PipelineSettings::default());

    let urls = vec!["http://a.com".to_string(), "not-a-url".to_string()];
    assert!(engine.shorten.shorten_batch(&urls, "u1").await.is_err());

    assert_eq!(repository.get_stats().await.unwrap().urls, 0);
    let fresh = engine.shorten.shorten("http://a.com", "u1").await.unwrap();
    assert!(!fresh.conflict);

    engine.stop().await;
}

#[tokio::test]
async fn test_concurrent_shortening_assigns_unique_codes() {
    let engine = Arc::new(Engine::start(
        Arc::new(MemoryUrlRepository::new()),
        PipelineSettings::default(),
    ));

    let mut handles = Vec::new();
    for i in 0..200 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let url = format!("http://site{}.example.com", i % 100);
            engine.shorten.shorten(&url, "u1").await.map(|o| (url, o.code))
        }));
    }

    let mut by_url = std::collections::HashMap::new();
    for handle in handles {
        let (url, code) = handle.await.unwrap().unwrap();
        let previous = by_url.insert(url, code.clone());
        if let Some(previous) = previous {
            assert_eq!(previous, code);
        }
    }

    let codes: HashSet<&String> = by_url.values().collect();
    assert_eq!(by_url.len(), 100);
    assert_eq!(codes.len(), 100);

    if let Ok(engine) = Arc::try_unwrap(engine) {
        engine.stop().await;
    }
}

#[tokio::test]
async fn test_more_tasks_than_queue_capacity_all_apply() {
    let settings = PipelineSettings {
        queue_capacity: 4,
        workers: 2,
        op_timeout: TIMEOUT,
    };
    let engine = Engine::start(Arc::new(MemoryUrlRepository::new()), settings);

    let mut codes = Vec::new();
    for i in 0..50 {
        let url = format!("http://page{i}.example.com");
        codes.push((engine.shorten.shorten(&url, "u1").await.unwrap().code, url));
    }

    for (code, _) in &codes {
        engine
            .deletion
            .submit_deletion(vec![code.clone()], "u1")
            .await
            .unwrap();
    }

    for (code, url) in &codes {
        let expected = Resolution::Deleted(url.clone());
        assert_eq!(engine.wait_for(code, &expected).await, expected);
    }

    engine.stop().await;
}

#[tokio::test]
async fn test_file_backend_scenario_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("storage.json");

    let code = {
        let repository = Arc::new(FileUrlRepository::open(&path).await.unwrap());
        let engine = Engine::start(repository, PipelineSettings::default());

        let created = engine.shorten.shorten("http://example.com", "u1").await.unwrap();
        engine
            .deletion
            .submit_deletion(vec![created.code.clone()], "u1")
            .await
            .unwrap();

        let deleted = Resolution::Deleted("http://example.com".into());
        assert_eq!(engine.wait_for(&created.code, &deleted).await, deleted);

        engine.stop().await;
        created.code
    };

    let reopened = FileUrlRepository::open(&path).await.unwrap();
    assert_eq!(
        reopened.get(&code).await.unwrap(),
        Resolution::Deleted("http://example.com".into())
    );

    let again = ShortenService::new(Arc::new(reopened), 6, TIMEOUT)
        .shorten("http://example.com", "u2")
        .await
        .unwrap();
    assert!(again.conflict);
    assert_eq!(again.code, code);
}
