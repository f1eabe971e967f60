//! Key-value state repository
//!
//! Durable process-wide state. Values are JSON documents stored as text in
//! `key_value`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::db::DynDatabasePool;

/// Repository trait for state operations
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Get the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Remove `key`
    async fn delete(&self, key: &str) -> Result<()>;
}

/// SQLx-based state repository
pub struct SqlxStateRepository {
    pool: DynDatabasePool,
}

impl SqlxStateRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn StateRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl StateRepository for SqlxStateRepository {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        get_sqlite(self.pool.sqlite(), key).await
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        set_sqlite(self.pool.sqlite(), key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        delete_sqlite(self.pool.sqlite(), key).await
    }
}

async fn get_sqlite(pool: &SqlitePool, key: &str) -> Result<Option<serde_json::Value>> {
    let row = sqlx::query("SELECT value FROM key_value WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to read state '{}'", key))?;

    match row {
        Some(row) => {
            let raw: String = row.get("value");
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Corrupt state value for '{}'", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

async fn set_sqlite(pool: &SqlitePool, key: &str, value: &serde_json::Value) -> Result<()> {
    sqlx::query(
        "INSERT INTO key_value (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await
    .with_context(|| format!("Failed to write state '{}'", key))?;
    Ok(())
}

async fn delete_sqlite(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM key_value WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete state '{}'", key))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use serde_json::json;

    async fn setup_test_repo() -> SqlxStateRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxStateRepository::new(pool)
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let repo = setup_test_repo().await;
        assert!(repo.get("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let repo = setup_test_repo().await;

        repo.set("k", &json!({"a": "node"})).await.unwrap();
        repo.set("k", &json!({"b": "user"})).await.unwrap();

        assert_eq!(repo.get("k").await.unwrap(), Some(json!({"b": "user"})));
    }

    #[tokio::test]
    async fn test_delete_key() {
        let repo = setup_test_repo().await;

        repo.set("k", &json!([1, 2])).await.unwrap();
        repo.delete("k").await.unwrap();

        assert!(repo.get("k").await.unwrap().is_none());
    }
}
