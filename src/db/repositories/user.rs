//! User repository
//!
//! Database operations for user accounts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use super::{count_sqlite, delete_by_ids_sqlite, load_refs_by_uuids_sqlite};
use crate::db::DynDatabasePool;
use crate::models::{new_uuid, CreateUserInput, EntityRef, User};

const TABLE: &str = "users";

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Get user by exact name
    async fn get_by_name(&self, name: &str) -> Result<Option<User>>;

    /// Count all users
    async fn count(&self) -> Result<i64>;

    /// Load users by UUID
    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>>;

    /// Delete users
    async fn delete(&self, users: &[EntityRef]) -> Result<u64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        create_user_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        get_user_by_name_sqlite(self.pool.sqlite(), name).await
    }

    async fn count(&self) -> Result<i64> {
        count_sqlite(self.pool.sqlite(), TABLE).await
    }

    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>> {
        load_refs_by_uuids_sqlite(self.pool.sqlite(), TABLE, uuids).await
    }

    async fn delete(&self, users: &[EntityRef]) -> Result<u64> {
        delete_by_ids_sqlite(self.pool.sqlite(), TABLE, users).await
    }
}

async fn create_user_sqlite(pool: &SqlitePool, input: &CreateUserInput) -> Result<User> {
    let now = Utc::now();
    let uuid = new_uuid();

    let result = sqlx::query(
        r#"
        INSERT INTO users (uuid, name, status, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&uuid)
    .bind(&input.name)
    .bind(input.status)
    .bind(now)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to create user '{}'", input.name))?;

    Ok(User {
        id: result.last_insert_rowid(),
        uuid,
        name: input.name.clone(),
        status: input.status,
        created_at: now,
    })
}

async fn get_user_by_name_sqlite(pool: &SqlitePool, name: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, uuid, name, status, created_at
        FROM users
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by name")?;

    Ok(row.map(|r| User {
        id: r.get("id"),
        uuid: r.get("uuid"),
        name: r.get("name"),
        status: r.get("status"),
        created_at: r.get("created_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_by_name() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&CreateUserInput::enabled("jdoe"))
            .await
            .expect("Failed to create user");
        assert!(created.id > 0);
        assert!(created.status);

        let found = repo
            .get_by_name("jdoe")
            .await
            .expect("Failed to get user")
            .expect("User should exist");
        assert_eq!(found.id, created.id);
        assert_eq!(found.uuid, created.uuid);
        assert!(found.status);
    }

    #[tokio::test]
    async fn test_get_by_name_is_exact() {
        let repo = setup_test_repo().await;
        repo.create(&CreateUserInput::enabled("jdoe")).await.unwrap();

        assert!(repo.get_by_name("jdo").await.unwrap().is_none());
        assert!(repo.get_by_name("jdoe ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let repo = setup_test_repo().await;
        repo.create(&CreateUserInput::enabled("jdoe")).await.unwrap();

        assert!(repo.create(&CreateUserInput::enabled("jdoe")).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_and_delete_by_uuid() {
        let repo = setup_test_repo().await;
        let a = repo.create(&CreateUserInput::enabled("a")).await.unwrap();
        let b = repo.create(&CreateUserInput::enabled("b")).await.unwrap();

        let loaded = repo
            .load_by_uuids(&[a.uuid.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, a.id);

        let deleted = repo.delete(&loaded).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.get_by_name("a").await.unwrap().is_none());
        assert!(repo.get_by_name(&b.name).await.unwrap().is_some());
    }
}
