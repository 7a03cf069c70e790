//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Connection, PgConnection, PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::{PendingUrl, Resolution, StoreStats, UrlRecord};
use crate::domain::errors::StorageError;
use crate::domain::repositories::UrlRepository;

/// Unique constraint guarding short codes, see `migrations/`.
const SHORT_CODE_CONSTRAINT: &str = "urls_short_url_key";

/// PostgreSQL repository for URL records.
///
/// Deduplication by original URL relies on the `urls_original_url_key`
/// unique constraint via `ON CONFLICT DO NOTHING`, so concurrent inserts of
/// one URL from several processes still converge on a single code.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Opens a connection pool for `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the first connection fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        Ok(Self::new(Arc::new(pool)))
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }
}

/// Inserts one record, or finds the code already stored for its URL.
async fn insert_or_existing(
    conn: &mut PgConnection,
    code: &str,
    original_url: &str,
    owner_id: &str,
) -> Result<String, StorageError> {
    let inserted: Option<String> = sqlx::query_scalar(
        r#"
        INSERT INTO urls (uuid, short_url, original_url, user_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (original_url) DO NOTHING
        RETURNING short_url
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(code)
    .bind(original_url)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_insert_error(e, code))?;

    if let Some(code) = inserted {
        return Ok(code);
    }

    let existing: String = sqlx::query_scalar("SELECT short_url FROM urls WHERE original_url = $1")
        .bind(original_url)
        .fetch_one(&mut *conn)
        .await?;

    Ok(existing)
}

fn map_insert_error(e: sqlx::Error, code: &str) -> StorageError {
    if is_unique_violation_on_code(&e) {
        StorageError::CodeCollision(code.to_string())
    } else {
        StorageError::Database(e)
    }
}

fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    db_err.is_unique_violation() && db_err.constraint() == Some(SHORT_CODE_CONSTRAINT)
}

fn record_from_row(row: &PgRow) -> Result<UrlRecord, sqlx::Error> {
    Ok(UrlRecord {
        id: row.try_get("uuid")?,
        short_code: row.try_get("short_url")?,
        original_url: row.try_get("original_url")?,
        owner_id: row.try_get("user_id")?,
        deleted: row.try_get("is_deleted")?,
    })
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn get(&self, code: &str) -> Result<Resolution, StorageError> {
        let row = sqlx::query("SELECT original_url, is_deleted FROM urls WHERE short_url = $1")
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        let Some(row) = row else {
            return Ok(Resolution::NotFound);
        };

        let original_url: String = row.try_get("original_url")?;
        let deleted: bool = row.try_get("is_deleted")?;

        Ok(if deleted {
            Resolution::Deleted(original_url)
        } else {
            Resolution::Active(original_url)
        })
    }

    async fn set(&self, code: &str, original_url: &str, owner_id: &str) -> Result<String, StorageError> {
        let mut conn = self.pool.acquire().await?;
        insert_or_existing(&mut conn, code, original_url, owner_id).await
    }

    async fn batch_set(
        &self,
        entries: Vec<PendingUrl>,
        owner_id: &str,
    ) -> Result<HashMap<String, String>, StorageError> {
        let mut resolved = HashMap::with_capacity(entries.len());
        if entries.is_empty() {
            return Ok(resolved);
        }

        let mut tx = self.pool.begin().await?;

        for PendingUrl { code, original_url } in entries {
            if resolved.contains_key(&original_url) {
                continue;
            }
            let stored = insert_or_existing(&mut tx, &code, &original_url, owner_id).await?;
            resolved.insert(original_url, stored);
        }

        tx.commit().await?;

        Ok(resolved)
    }

    async fn batch_delete(&self, codes: &[String], owner_id: &str) -> Result<u64, StorageError> {
        if codes.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE urls
            SET is_deleted = TRUE
            WHERE short_url = ANY($1) AND user_id = $2
            "#,
        )
        .bind(codes)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_user_records(&self, owner_id: &str) -> Result<Vec<UrlRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT uuid, short_url, original_url, user_id, is_deleted
            FROM urls
            WHERE user_id = $1 AND NOT is_deleted
            ORDER BY created_at, short_url
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    async fn get_stats(&self) -> Result<StoreStats, StorageError> {
        let row = sqlx::query("SELECT COUNT(DISTINCT user_id) AS users, COUNT(*) AS urls FROM urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(StoreStats {
            users: count_to_u64(row.try_get("users")?),
            urls: count_to_u64(row.try_get("urls")?),
        })
    }

    async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_not_code_collision() {
        assert!(!is_unique_violation_on_code(&sqlx::Error::RowNotFound));
        assert!(matches!(
            map_insert_error(sqlx::Error::PoolTimedOut, "abc123"),
            StorageError::Database(_)
        ));
    }

    #[test]
    fn test_count_to_u64_clamps_negative() {
        assert_eq!(count_to_u64(42), 42);
        assert_eq!(count_to_u64(-1), 0);
    }
}
