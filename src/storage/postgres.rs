//! Postgres storage backend over the `site_entries` table.

use sqlx::PgPool;
use std::sync::Arc;

use super::{KeyValueStore, StorageResult};
use crate::db::{self, models::SiteEntry};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Full row for a key, including its last write time
    pub async fn entry(&self, key: &str) -> StorageResult<Option<SiteEntry>> {
        let entry = sqlx::query_as::<_, SiteEntry>(
            "SELECT key, value, updated_at FROM site_entries WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(entry)
    }
}

impl KeyValueStore for PgStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entry(key).await?.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO site_entries (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = now()
            "#,
        )
        .bind(key)
        .bind(&value)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(key = %key, error = %e, "failed to write site entry");
            e
        })?;

        Ok(())
    }

    async fn ping(&self) -> StorageResult<()> {
        let elapsed = db::health_check(self.pool.as_ref()).await?;
        tracing::trace!(elapsed_ms = %elapsed.as_millis(), "database ping");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
