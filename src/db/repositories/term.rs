//! Taxonomy term repository
//!
//! Terms are unique per (name, vocabulary).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use super::{count_sqlite, delete_by_ids_sqlite, load_refs_by_uuids_sqlite};
use crate::db::DynDatabasePool;
use crate::models::{new_uuid, CreateTermInput, EntityRef, Term};

const TABLE: &str = "taxonomy_terms";

/// Term repository trait
#[async_trait]
pub trait TermRepository: Send + Sync {
    /// Create a new term
    async fn create(&self, input: &CreateTermInput) -> Result<Term>;

    /// Get a term by name within a vocabulary
    async fn get_by_name(&self, name: &str, vocabulary: &str) -> Result<Option<Term>>;

    /// Count all terms
    async fn count(&self) -> Result<i64>;

    /// Load terms by UUID
    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>>;

    /// Delete terms
    async fn delete(&self, terms: &[EntityRef]) -> Result<u64>;
}

/// SQLx-based term repository implementation
pub struct SqlxTermRepository {
    pool: DynDatabasePool,
}

impl SqlxTermRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TermRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TermRepository for SqlxTermRepository {
    async fn create(&self, input: &CreateTermInput) -> Result<Term> {
        create_term_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_by_name(&self, name: &str, vocabulary: &str) -> Result<Option<Term>> {
        get_term_by_name_sqlite(self.pool.sqlite(), name, vocabulary).await
    }

    async fn count(&self) -> Result<i64> {
        count_sqlite(self.pool.sqlite(), TABLE).await
    }

    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>> {
        load_refs_by_uuids_sqlite(self.pool.sqlite(), TABLE, uuids).await
    }

    async fn delete(&self, terms: &[EntityRef]) -> Result<u64> {
        delete_by_ids_sqlite(self.pool.sqlite(), TABLE, terms).await
    }
}

async fn create_term_sqlite(pool: &SqlitePool, input: &CreateTermInput) -> Result<Term> {
    let now = Utc::now();
    let uuid = new_uuid();

    let result = sqlx::query(
        r#"
        INSERT INTO taxonomy_terms (uuid, name, vocabulary, alias, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&uuid)
    .bind(&input.name)
    .bind(&input.vocabulary)
    .bind(&input.alias)
    .bind(now)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to create term '{}' in '{}'", input.name, input.vocabulary))?;

    Ok(Term {
        id: result.last_insert_rowid(),
        uuid,
        name: input.name.clone(),
        vocabulary: input.vocabulary.clone(),
        alias: input.alias.clone(),
        created_at: now,
    })
}

async fn get_term_by_name_sqlite(
    pool: &SqlitePool,
    name: &str,
    vocabulary: &str,
) -> Result<Option<Term>> {
    let row = sqlx::query(
        r#"
        SELECT id, uuid, name, vocabulary, alias, created_at
        FROM taxonomy_terms
        WHERE name = ? AND vocabulary = ?
        "#,
    )
    .bind(name)
    .bind(vocabulary)
    .fetch_optional(pool)
    .await
    .context("Failed to get term by name")?;

    Ok(row.map(|r| Term {
        id: r.get("id"),
        uuid: r.get("uuid"),
        name: r.get("name"),
        vocabulary: r.get("vocabulary"),
        alias: r.get("alias"),
        created_at: r.get("created_at"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxTermRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxTermRepository::new(pool)
    }

    fn tag_input(name: &str) -> CreateTermInput {
        CreateTermInput {
            name: name.to_string(),
            vocabulary: "tags".to_string(),
            alias: Some(format!("/tags/{}", name.to_lowercase())),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_name() {
        let repo = setup_test_repo().await;

        let created = repo.create(&tag_input("News")).await.expect("Failed to create term");
        let found = repo
            .get_by_name("News", "tags")
            .await
            .unwrap()
            .expect("Term should exist");

        assert_eq!(found.id, created.id);
        assert_eq!(found.uuid, created.uuid);
        assert_eq!(found.vocabulary, "tags");
        assert_eq!(found.alias.as_deref(), Some("/tags/news"));
    }

    #[tokio::test]
    async fn test_lookup_is_scoped_to_vocabulary() {
        let repo = setup_test_repo().await;
        repo.create(&tag_input("News")).await.unwrap();

        assert!(repo.get_by_name("News", "categories").await.unwrap().is_none());

        let other = CreateTermInput {
            name: "News".to_string(),
            vocabulary: "categories".to_string(),
            alias: None,
        };
        repo.create(&other).await.expect("Same name in another vocabulary is allowed");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_load_by_uuids_skips_unknown() {
        let repo = setup_test_repo().await;
        let term = repo.create(&tag_input("Tips")).await.unwrap();

        let loaded = repo
            .load_by_uuids(&["nope".to_string(), term.uuid.clone()])
            .await
            .unwrap();
        assert_eq!(loaded, vec![EntityRef { id: term.id, uuid: term.uuid }]);
    }
}
