use std::sync::Arc;

use crate::application::services::{DeletionService, RetrievalService, ShortenService};
use crate::config::Config;
use crate::domain::deletion_worker::DeletionPipeline;
use crate::domain::repositories::UrlRepository;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub shorten_service: Arc<ShortenService<dyn UrlRepository>>,
    pub retrieval_service: Arc<RetrievalService<dyn UrlRepository>>,
    pub deletion_service: Arc<DeletionService>,
    pub base_url: Arc<str>,
}

impl AppState {
    /// Wires the services over one repository and a running deletion pipeline.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        pipeline: DeletionPipeline,
        config: &Config,
    ) -> Self {
        let op_timeout = config.op_timeout();

        Self {
            shorten_service: Arc::new(ShortenService::new(
                repository.clone(),
                config.code_length,
                op_timeout,
            )),
            retrieval_service: Arc::new(RetrievalService::new(repository, op_timeout)),
            deletion_service: Arc::new(DeletionService::new(pipeline)),
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
        }
    }

    /// Renders the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
