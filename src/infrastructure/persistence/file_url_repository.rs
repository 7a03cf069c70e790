//! Append-only JSON lines implementation of the URL repository.
//!
//! One JSON object per line:
//!
//! ```text
//! {"uuid":"…","short_url":"abc123","original_url":"http://example.com","user_id":"u1","is_deleted":false}
//! ```
//!
//! New records are appended. Soft deletes rewrite the whole file through a
//! temporary sibling that is renamed over the original, so a crash leaves
//! either the old or the new contents on disk.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

use crate::domain::entities::{PendingUrl, Resolution, StoreStats, UrlRecord};
use crate::domain::errors::StorageError;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::url_table::UrlTable;

/// On-disk line layout.
#[derive(Debug, Serialize, Deserialize)]
struct FileRecord {
    uuid: String,
    short_url: String,
    original_url: String,
    user_id: String,
    #[serde(default)]
    is_deleted: bool,
}

impl From<&UrlRecord> for FileRecord {
    fn from(record: &UrlRecord) -> Self {
        Self {
            uuid: record.id.to_string(),
            short_url: record.short_code.clone(),
            original_url: record.original_url.clone(),
            user_id: record.owner_id.clone(),
            is_deleted: record.deleted,
        }
    }
}

impl From<FileRecord> for UrlRecord {
    fn from(line: FileRecord) -> Self {
        // Older files may carry non-UUID ids; they get a fresh one that is
        // persisted on the next rewrite.
        let id = Uuid::parse_str(&line.uuid).unwrap_or_else(|_| Uuid::new_v4());
        Self {
            id,
            short_code: line.short_url,
            original_url: line.original_url,
            owner_id: line.user_id,
            deleted: line.is_deleted,
        }
    }
}

/// Repository persisted to a JSON lines file and served from memory.
///
/// The file and the in-memory table share one guard. Writes run on a spawned
/// task that owns the guard, so a caller dropping its future cannot leave a
/// record on disk that the table never saw.
#[derive(Debug)]
pub struct FileUrlRepository {
    path: Arc<Path>,
    table: Arc<RwLock<UrlTable>>,
}

impl FileUrlRepository {
    /// Opens the store at `path`, loading any existing records.
    ///
    /// A missing file is treated as an empty store and created on first
    /// write. Lines that fail to parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path: PathBuf = path.into();
        let table = UrlTable::from_records(load_records(&path).await?);

        tracing::info!(
            path = %path.display(),
            records = table.len(),
            "File storage loaded"
        );

        Ok(Self {
            path: Arc::from(path),
            table: Arc::new(RwLock::new(table)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `write` to completion on its own task while holding the table
    /// lock, whether or not the caller keeps waiting.
    async fn commit<T, F, Fut>(&self, write: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Path>, OwnedRwLockWriteGuard<UrlTable>) -> Fut,
        Fut: Future<Output = Result<T, StorageError>> + Send + 'static,
    {
        let table = Arc::clone(&self.table).write_owned().await;
        tokio::spawn(write(Arc::clone(&self.path), table))
            .await
            .map_err(|e| StorageError::Unavailable(format!("storage write task failed: {e}")))?
    }
}

/// Appends `records` as new lines.
///
/// A trailing fragment left by an earlier failed write is closed off with a
/// newline first, and a failed write is truncated back to the previous length.
async fn append(path: &Path, records: &[UrlRecord]) -> Result<(), StorageError> {
    if records.is_empty() {
        return Ok(());
    }

    let mut buf = encode_lines(records.iter())?;
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .await?;

    let start = file.metadata().await?.len();
    if start > 0 && !ends_with_newline(&mut file, start).await? {
        buf.insert(0, b'\n');
    }

    let written = async {
        file.write_all(&buf).await?;
        file.flush().await?;
        file.sync_data().await
    }
    .await;

    if let Err(e) = written {
        if let Err(truncate) = file.set_len(start).await {
            tracing::error!(
                path = %path.display(),
                error = %truncate,
                "Failed to truncate storage file after a failed append"
            );
        }
        return Err(e.into());
    }
    Ok(())
}

async fn ends_with_newline(file: &mut fs::File, len: u64) -> std::io::Result<bool> {
    file.seek(SeekFrom::Start(len - 1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}

async fn rewrite(path: &Path, table: &UrlTable) -> Result<(), StorageError> {
    let buf = encode_lines(table.records().into_iter())?;
    let temp_path = temp_path_for(path);

    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&buf).await?;
        file.flush().await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

async fn load_records(path: &Path) -> Result<Vec<UrlRecord>, StorageError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<FileRecord>(line) {
            Ok(record) => records.push(record.into()),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed storage line"
                );
            }
        }
    }
    Ok(records)
}

fn encode_lines<'a>(records: impl Iterator<Item = &'a UrlRecord>) -> Result<Vec<u8>, StorageError> {
    let mut buf = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buf, &FileRecord::from(record))?;
        buf.push(b'\n');
    }
    Ok(buf)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".tmp.{}", Uuid::new_v4().simple()));
    path.with_file_name(name)
}

#[async_trait]
impl UrlRepository for FileUrlRepository {
    async fn get(&self, code: &str) -> Result<Resolution, StorageError> {
        Ok(self.table.read().await.resolve(code))
    }

    async fn set(&self, code: &str, original_url: &str, owner_id: &str) -> Result<String, StorageError> {
        let mut resolved = self
            .batch_set(vec![PendingUrl::new(code, original_url)], owner_id)
            .await?;

        resolved
            .remove(original_url)
            .ok_or_else(|| StorageError::Unavailable(format!("no code resolved for {original_url}")))
    }

    async fn batch_set(
        &self,
        entries: Vec<PendingUrl>,
        owner_id: &str,
    ) -> Result<HashMap<String, String>, StorageError> {
        let owner_id = owner_id.to_string();

        self.commit(move |path, mut table| async move {
            let plan = table.plan(entries, &owner_id)?;
            append(&path, &plan.fresh).await?;
            Ok::<_, StorageError>(table.apply(plan))
        })
        .await
    }

    async fn batch_delete(&self, codes: &[String], owner_id: &str) -> Result<u64, StorageError> {
        let codes = codes.to_vec();
        let owner_id = owner_id.to_string();

        self.commit(move |path, mut table| async move {
            let mut next = table.clone();
            let tally = next.mark_deleted(&codes, &owner_id);
            if tally.flipped > 0 {
                rewrite(&path, &next).await?;
                *table = next;
            }
            Ok::<_, StorageError>(tally.matched)
        })
        .await
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
