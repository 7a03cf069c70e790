//! In-memory implementation of the URL repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{PendingUrl, Resolution, StoreStats, UrlRecord};
use crate::domain::errors::StorageError;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::url_table::UrlTable;

/// Process-local repository; contents are lost on restart.
///
/// Readers share the lock, every mutation takes it exclusively so a batch
/// is observed either entirely or not at all.
#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    table: RwLock<UrlTable>,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn get(&self, code: &str) -> Result<Resolution, StorageError> {
        Ok(self.table.read().await.resolve(code))
    }

    async fn set(&self, code: &str, original_url: &str, owner_id: &str) -> Result<String, StorageError> {
        let mut table = self.table.write().await;
        let plan = table.plan(vec![PendingUrl::new(code, original_url)], owner_id)?;
        let mut resolved = table.apply(plan);

        resolved
            .remove(original_url)
            .ok_or_else(|| StorageError::Unavailable(format!("no code resolved for {original_url}")))
    }

    async fn batch_set(
        &self,
        entries: Vec<PendingUrl>,
        owner_id: &str,
    ) -> Result<HashMap<String, String>, StorageError> {
        let mut table = self.table.write().await;
        let plan = table.plan(entries, owner_id)?;
        Ok(table.apply(plan))
    }

    async fn batch_delete(&self, codes: &[String], owner_id: &str) -> Result<u64, StorageError> {
        let tally = self.table.write().await.mark_deleted(codes, owner_id);
        Ok(tally.matched)
    }

    async fn get_user_records(&self, owner_id: &str) -> Result<Vec<UrlRecord>, StorageError> {
        Ok(self.table.read().await.user_records(owner_id))
    }

    async fn get_stats(&self) -> Result<StoreStats, StorageError> {
        Ok(self.table.read().await.stats())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
