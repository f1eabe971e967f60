//! Database repositories
//!
//! Repository pattern implementations for database access. Each repository
//! handles one entity type; `EntityStores` groups them so callers holding only
//! an `EntityType` (such as the creation log) can bulk-load and delete.

pub mod file;
pub mod node;
pub mod state;
pub mod term;
pub mod user;

pub use file::{FileRepository, SqlxFileRepository};
pub use node::{NodeRepository, SqlxNodeRepository};
pub use state::{SqlxStateRepository, StateRepository};
pub use term::{SqlxTermRepository, TermRepository};
pub use user::{SqlxUserRepository, UserRepository};

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::db::DynDatabasePool;
use crate::models::{EntityRef, EntityType};

/// Storage for every entity type the importer creates
#[derive(Clone)]
pub struct EntityStores {
    pub nodes: Arc<dyn NodeRepository>,
    pub users: Arc<dyn UserRepository>,
    pub terms: Arc<dyn TermRepository>,
    pub files: Arc<dyn FileRepository>,
}

impl EntityStores {
    /// Build SQLx-backed stores sharing one pool
    pub fn from_pool(pool: DynDatabasePool) -> Self {
        Self {
            nodes: SqlxNodeRepository::boxed(pool.clone()),
            users: SqlxUserRepository::boxed(pool.clone()),
            terms: SqlxTermRepository::boxed(pool.clone()),
            files: SqlxFileRepository::boxed(pool),
        }
    }

    /// Load the entities of one type whose UUID is in `uuids`.
    ///
    /// UUIDs with no matching entity are absent from the result.
    pub async fn load_by_uuids(
        &self,
        entity_type: EntityType,
        uuids: &[String],
    ) -> Result<Vec<EntityRef>> {
        match entity_type {
            EntityType::Node => self.nodes.load_by_uuids(uuids).await,
            EntityType::User => self.users.load_by_uuids(uuids).await,
            EntityType::TaxonomyTerm => self.terms.load_by_uuids(uuids).await,
            EntityType::File => self.files.load_by_uuids(uuids).await,
        }
    }

    /// Delete entities of one type, returning how many rows were removed
    pub async fn delete(&self, entity_type: EntityType, entities: &[EntityRef]) -> Result<u64> {
        match entity_type {
            EntityType::Node => self.nodes.delete(entities).await,
            EntityType::User => self.users.delete(entities).await,
            EntityType::TaxonomyTerm => self.terms.delete(entities).await,
            EntityType::File => self.files.delete(entities).await,
        }
    }
}

// ============================================================================
// Shared SQLite helpers
// ============================================================================

/// Values bound per `IN (...)` list, well below SQLite's host parameter limit
const IN_LIST_CHUNK: usize = 500;

/// `SELECT id, uuid FROM <table> WHERE uuid IN (...)`, run per chunk
pub(crate) async fn load_refs_by_uuids_sqlite(
    pool: &SqlitePool,
    table: &'static str,
    uuids: &[String],
) -> Result<Vec<EntityRef>> {
    let mut refs = Vec::with_capacity(uuids.len());

    for chunk in uuids.chunks(IN_LIST_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT id, uuid FROM {} WHERE uuid IN (", table));
        let mut separated = builder.separated(", ");
        for uuid in chunk {
            separated.push_bind(uuid.clone());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build()
            .fetch_all(pool)
            .await
            .with_context(|| format!("Failed to load {} by uuid", table))?;

        refs.extend(rows.iter().map(|row| EntityRef {
            id: row.get("id"),
            uuid: row.get("uuid"),
        }));
    }

    refs.sort_by_key(|entity| entity.id);
    Ok(refs)
}

/// `DELETE FROM <table> WHERE id IN (...)`, run per chunk
pub(crate) async fn delete_by_ids_sqlite(
    pool: &SqlitePool,
    table: &'static str,
    entities: &[EntityRef],
) -> Result<u64> {
    let mut deleted = 0;

    for chunk in entities.chunks(IN_LIST_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("DELETE FROM {} WHERE id IN (", table));
        let mut separated = builder.separated(", ");
        for entity in chunk {
            separated.push_bind(entity.id);
        }
        separated.push_unseparated(")");

        let result = builder
            .build()
            .execute(pool)
            .await
            .with_context(|| format!("Failed to delete from {}", table))?;
        deleted += result.rows_affected();
    }

    Ok(deleted)
}

/// Count rows in a table
pub(crate) async fn count_sqlite(pool: &SqlitePool, table: &'static str) -> Result<i64> {
    let row = sqlx::query(&format!("SELECT COUNT(*) AS count FROM {}", table))
        .fetch_one(pool)
        .await
        .with_context(|| format!("Failed to count {}", table))?;
    Ok(row.get("count"))
}
