#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use url_shortener::config::Config;
use url_shortener::domain::deletion_worker::{DeletionPipeline, DeletionWorkers};
use url_shortener::domain::entities::Resolution;
use url_shortener::domain::repositories::UrlRepository;
use url_shortener::infrastructure::persistence::MemoryUrlRepository;
use url_shortener::routes::router;
use url_shortener::state::AppState;

pub const BASE_URL: &str = "http://sho.rt";

pub fn owner_header() -> HeaderName {
    HeaderName::from_static("x-user-id")
}

pub fn owner(id: &str) -> HeaderValue {
    HeaderValue::from_str(id).unwrap()
}

pub fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        base_url: BASE_URL.to_string(),
        database_url: None,
        file_storage_path: None,
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        code_length: 6,
        delete_queue_capacity: 100,
        delete_workers: 5,
        db_max_connections: 1,
        db_timeout_seconds: 5,
    }
}

/// Full router over an in-memory store with a running deletion pipeline.
pub struct TestApp {
    pub server: TestServer,
    pub repository: Arc<MemoryUrlRepository>,
    stop: watch::Sender<bool>,
    workers: DeletionWorkers,
}

impl TestApp {
    pub fn spawn() -> Self {
        let config = test_config();
        let repository = Arc::new(MemoryUrlRepository::new());
        let (stop, stop_rx) = watch::channel(false);
        let (pipeline, workers) = DeletionPipeline::start(
            repository.clone(),
            config.pipeline_settings(),
            stop_rx,
        );

        let state = AppState::new(repository.clone() as Arc<dyn UrlRepository>, pipeline, &config);
        let server = TestServer::new(router(state)).unwrap();

        Self {
            server,
            repository,
            stop,
            workers,
        }
    }

    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        self.workers.join().await;
    }
}

/// Code part of a rendered short URL.
pub fn code_of(short_url: &str) -> String {
    short_url
        .strip_prefix(&format!("{BASE_URL}/"))
        .unwrap_or_else(|| panic!("unexpected short URL {short_url}"))
        .to_string()
}

/// Polls until `code` reads as deleted or the attempts run out.
pub async fn wait_for_deleted(repository: &dyn UrlRepository, code: &str) -> Resolution {
    for _ in 0..200 {
        let resolution = repository.get(code).await.unwrap();
        if resolution.is_deleted() {
            return resolution;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    repository.get(code).await.unwrap()
}
