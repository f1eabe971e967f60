//! Content item repository
//!
//! Content items are stored in `nodes`; tag references live in `node_tags`
//! keyed by position (`delta`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use super::{count_sqlite, delete_by_ids_sqlite, load_refs_by_uuids_sqlite};
use crate::db::DynDatabasePool;
use crate::models::{
    new_uuid, Body, ContentItem, ContentKind, EntityRef, ImageRef, NewContentItem,
};

const TABLE: &str = "nodes";

/// Content item repository trait
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Persist a new content item together with its tag references
    async fn create(&self, item: &NewContentItem) -> Result<ContentItem>;

    /// Get content item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ContentItem>>;

    /// List content items of one kind, oldest first
    async fn list_by_kind(&self, kind: ContentKind) -> Result<Vec<ContentItem>>;

    /// Count all content items
    async fn count(&self) -> Result<i64>;

    /// Load content items by UUID
    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>>;

    /// Delete content items; their tag references go with them
    async fn delete(&self, nodes: &[EntityRef]) -> Result<u64>;
}

/// SQLx-based content item repository implementation
pub struct SqlxNodeRepository {
    pool: DynDatabasePool,
}

impl SqlxNodeRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NodeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NodeRepository for SqlxNodeRepository {
    async fn create(&self, item: &NewContentItem) -> Result<ContentItem> {
        create_node_sqlite(self.pool.sqlite(), item).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContentItem>> {
        get_node_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn list_by_kind(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        list_nodes_by_kind_sqlite(self.pool.sqlite(), kind).await
    }

    async fn count(&self) -> Result<i64> {
        count_sqlite(self.pool.sqlite(), TABLE).await
    }

    async fn load_by_uuids(&self, uuids: &[String]) -> Result<Vec<EntityRef>> {
        load_refs_by_uuids_sqlite(self.pool.sqlite(), TABLE, uuids).await
    }

    async fn delete(&self, nodes: &[EntityRef]) -> Result<u64> {
        delete_by_ids_sqlite(self.pool.sqlite(), TABLE, nodes).await
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_node_sqlite(pool: &SqlitePool, item: &NewContentItem) -> Result<ContentItem> {
    let now = Utc::now();
    let uuid = new_uuid();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO nodes (uuid, kind, title, body, body_format, alias, owner_id,
                           image_file_id, image_alt, video, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&uuid)
    .bind(item.kind.as_str())
    .bind(&item.title)
    .bind(item.body.as_ref().map(|b| b.value.as_str()))
    .bind(item.body.as_ref().map(|b| b.format.as_str()))
    .bind(&item.alias)
    .bind(item.owner_id)
    .bind(item.image.as_ref().map(|i| i.file_id))
    .bind(item.image.as_ref().map(|i| i.alt.as_str()))
    .bind(&item.video)
    .bind(now)
    .execute(&mut *tx)
    .await
    .with_context(|| format!("Failed to create {} '{}'", item.kind, item.title))?;

    let id = result.last_insert_rowid();

    for (delta, term_id) in item.tag_ids.iter().enumerate() {
        sqlx::query("INSERT INTO node_tags (node_id, term_id, delta) VALUES (?, ?, ?)")
            .bind(id)
            .bind(*term_id)
            .bind(delta as i64)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to attach term {} to node {}", term_id, id))?;
    }

    tx.commit().await.context("Failed to commit content item")?;

    Ok(ContentItem {
        id,
        uuid,
        kind: item.kind,
        title: item.title.clone(),
        body: item.body.clone(),
        alias: item.alias.clone(),
        tag_ids: item.tag_ids.clone(),
        owner_id: item.owner_id,
        image: item.image.clone(),
        video: item.video.clone(),
        created_at: now,
    })
}

async fn get_node_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<ContentItem>> {
    let row = sqlx::query(
        r#"
        SELECT id, uuid, kind, title, body, body_format, alias, owner_id,
               image_file_id, image_alt, video, created_at
        FROM nodes
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get content item by ID")?;

    match row {
        Some(row) => {
            let tag_ids = get_tag_ids_sqlite(pool, id).await?;
            Ok(Some(row_to_node_sqlite(&row, tag_ids)?))
        }
        None => Ok(None),
    }
}

async fn list_nodes_by_kind_sqlite(
    pool: &SqlitePool,
    kind: ContentKind,
) -> Result<Vec<ContentItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, uuid, kind, title, body, body_format, alias, owner_id,
               image_file_id, image_alt, video, created_at
        FROM nodes
        WHERE kind = ?
        ORDER BY id
        "#,
    )
    .bind(kind.as_str())
    .fetch_all(pool)
    .await
    .context("Failed to list content items")?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let tag_ids = get_tag_ids_sqlite(pool, row.get("id")).await?;
        items.push(row_to_node_sqlite(&row, tag_ids)?);
    }
    Ok(items)
}

async fn get_tag_ids_sqlite(pool: &SqlitePool, node_id: i64) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT term_id FROM node_tags WHERE node_id = ? ORDER BY delta")
        .bind(node_id)
        .fetch_all(pool)
        .await
        .context("Failed to get content item tags")?;

    Ok(rows.iter().map(|r| r.get("term_id")).collect())
}

fn row_to_node_sqlite(row: &sqlx::sqlite::SqliteRow, tag_ids: Vec<i64>) -> Result<ContentItem> {
    let kind_str: String = row.get("kind");
    let kind = ContentKind::from_str(&kind_str)
        .with_context(|| format!("Invalid content kind in database: {}", kind_str))?;

    let body_value: Option<String> = row.get("body");
    let body_format: Option<String> = row.get("body_format");
    let body = body_value.map(|value| Body {
        value,
        format: body_format.unwrap_or_default(),
    });

    let image_file_id: Option<i64> = row.get("image_file_id");
    let image_alt: Option<String> = row.get("image_alt");
    let image = image_file_id.map(|file_id| ImageRef {
        file_id,
        alt: image_alt.unwrap_or_default(),
    });

    Ok(ContentItem {
        id: row.get("id"),
        uuid: row.get("uuid"),
        kind,
        title: row.get("title"),
        body,
        alias: row.get("alias"),
        tag_ids,
        owner_id: row.get("owner_id"),
        image,
        video: row.get("video"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxTermRepository, SqlxUserRepository, TermRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateTermInput, CreateUserInput};

    async fn setup_test_pool() -> DynDatabasePool {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    async fn create_test_term(pool: &DynDatabasePool, name: &str) -> i64 {
        SqlxTermRepository::new(pool.clone())
            .create(&CreateTermInput {
                name: name.to_string(),
                vocabulary: "tags".to_string(),
                alias: None,
            })
            .await
            .expect("Failed to create term")
            .id
    }

    #[tokio::test]
    async fn test_create_minimal_page() {
        let pool = setup_test_pool().await;
        let repo = SqlxNodeRepository::new(pool);

        let created = repo
            .create(&NewContentItem::new(ContentKind::Page, "About"))
            .await
            .expect("Failed to create page");

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.kind, ContentKind::Page);
        assert_eq!(found.title, "About");
        assert!(found.body.is_none());
        assert!(found.alias.is_none());
        assert!(found.tag_ids.is_empty());
        assert!(found.owner_id.is_none());
    }

    #[tokio::test]
    async fn test_create_full_article() {
        let pool = setup_test_pool().await;
        let owner = SqlxUserRepository::new(pool.clone())
            .create(&CreateUserInput::enabled("jdoe"))
            .await
            .unwrap();
        let news = create_test_term(&pool, "News").await;
        let tips = create_test_term(&pool, "Tips").await;
        let repo = SqlxNodeRepository::new(pool);

        let item = NewContentItem::new(ContentKind::Article, "Hello")
            .with_body(Body::full_html("<p>Hi</p>"))
            .with_slug("hello-world")
            .with_tags([tips, news])
            .with_owner(owner.id);
        let created = repo.create(&item).await.expect("Failed to create article");

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.alias.as_deref(), Some("/hello-world"));
        assert_eq!(found.body, Some(Body::full_html("<p>Hi</p>")));
        assert_eq!(found.tag_ids, vec![tips, news]);
        assert_eq!(found.owner_id, Some(owner.id));
    }

    #[tokio::test]
    async fn test_unknown_owner_is_rejected() {
        let pool = setup_test_pool().await;
        let repo = SqlxNodeRepository::new(pool);

        let item = NewContentItem::new(ContentKind::Page, "Orphan").with_owner(9999);
        assert!(repo.create(&item).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_tag_links() {
        let pool = setup_test_pool().await;
        let tag = create_test_term(&pool, "News").await;
        let repo = SqlxNodeRepository::new(pool.clone());

        let created = repo
            .create(&NewContentItem::new(ContentKind::Article, "Tagged").with_tags([tag]))
            .await
            .unwrap();

        let refs = repo.load_by_uuids(&[created.uuid.clone()]).await.unwrap();
        assert_eq!(repo.delete(&refs).await.unwrap(), 1);

        let links: i64 = sqlx::query("SELECT COUNT(*) AS count FROM node_tags")
            .fetch_one(pool.sqlite())
            .await
            .unwrap()
            .get("count");
        assert_eq!(links, 0);
    }

    #[tokio::test]
    async fn test_list_by_kind() {
        let pool = setup_test_pool().await;
        let repo = SqlxNodeRepository::new(pool);

        repo.create(&NewContentItem::new(ContentKind::Video, "Clip").with_video("https://youtu.be/x"))
            .await
            .unwrap();
        repo.create(&NewContentItem::new(ContentKind::Page, "About"))
            .await
            .unwrap();

        let videos = repo.list_by_kind(ContentKind::Video).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video.as_deref(), Some("https://youtu.be/x"));
    }
}
