//! Managed file repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use super::{count_sqlite, delete_by_ids_sqlite, load_refs_by_uuids_sqlite};
use crate::db::DynDatabasePool;
use crate::models::{new_uuid, EntityRef, ManagedFile};

const TABLE: &str = "files";

/// File repository trait
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Create a permanent file entity pointing at `uri`
    async fn create(&self, uri: &str) -> Result<ManagedFile>;

    /// Get file by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ManagedFile>>;

    /// Count all files
    async fn count(&self) -> Result<i64>;

    /// Load files by UUID
    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>>;

    /// Delete file entities (the copied files on disk are left in place)
    async fn delete(&self, files: &[EntityRef]) -> Result<u64>;
}

/// SQLx-based file repository implementation
pub struct SqlxFileRepository {
    pool: DynDatabasePool,
}

impl SqlxFileRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn FileRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl FileRepository for SqlxFileRepository {
    async fn create(&self, uri: &str) -> Result<ManagedFile> {
        create_file_sqlite(self.pool.sqlite(), uri).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ManagedFile>> {
        get_file_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn count(&self) -> Result<i64> {
        count_sqlite(self.pool.sqlite(), TABLE).await
    }

    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>> {
        load_refs_by_uuids_sqlite(self.pool.sqlite(), TABLE, uuids).await
    }

    async fn delete(&self, files: &[EntityRef]) -> Result<u64> {
        delete_by_ids_sqlite(self.pool.sqlite(), TABLE, files).await
    }
}

async fn create_file_sqlite(pool: &SqlitePool, uri: &str) -> Result<ManagedFile> {
    let now = Utc::now();
    let uuid = new_uuid();

    let result = sqlx::query("INSERT INTO files (uuid, uri, status, created_at) VALUES (?, ?, 1, ?)")
        .bind(&uuid)
        .bind(uri)
        .bind(now)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create file entity for {}", uri))?;

    Ok(ManagedFile {
        id: result.last_insert_rowid(),
        uuid,
        uri: uri.to_string(),
        status: true,
        created_at: now,
    })
}

async fn get_file_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<ManagedFile>> {
    let row = sqlx::query("SELECT id, uuid, uri, status, created_at FROM files WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get file by ID")?;

    Ok(row.map(|r| ManagedFile {
        id: r.get("id"),
        uuid: r.get("uuid"),
        uri: r.get("uri"),
        status: r.get("status"),
        created_at: r.get("created_at"),
    }))
}
