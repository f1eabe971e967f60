//! Demo content importer
//!
//! Reads the bundled CSV sources, turns each row into a content item, creates
//! the users, tags and image files the rows reference, and records every
//! created entity in the creation log so `delete_imported_content` can remove
//! them again.
//!
//! Sources, relative to the configured source directory:
//! - `video.csv`    (title, body, slug, author, video)
//! - `pages.csv`    (title, body, slug, author)
//! - `articles.csv` (title, body, slug, tags, author, image, alt)
//! - `images/<file>` for the article `image` column
//!
//! Imports run sequentially and are not safe to run concurrently with each
//! other or with a delete: the creation log is updated by read-modify-write.

mod error;
mod report;
mod row;


pub use error::ImportError;
pub use report::{DeleteReport, ImportReport, RowWarning};
pub use row::ImportRow;

use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::config::ContentConfig;
use crate::db::repositories::{EntityStores, SqlxStateRepository};
use crate::db::DynDatabasePool;
use crate::models::{
    Body, ContentItem, ContentKind, CreateTermInput, CreateUserInput, EntityRef, EntityType,
    NewContentItem, TAGS_VOCABULARY,
};
use crate::services::alias::term_alias;
use crate::services::creation_log::CreationLog;
use crate::services::file_copy::{FileCopier, PublicDirectoryCopier};

pub const ARTICLES_CSV: &str = "articles.csv";
pub const VIDEOS_CSV: &str = "video.csv";
pub const PAGES_CSV: &str = "pages.csv";
pub const IMAGES_DIR: &str = "images";

/// Imports demo content and rolls it back
pub struct ContentImporter {
    stores: EntityStores,
    log: CreationLog,
    files: Arc<dyn FileCopier>,
    source_dir: PathBuf,
}

impl ContentImporter {
    pub fn new(
        stores: EntityStores,
        log: CreationLog,
        files: Arc<dyn FileCopier>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stores,
            log,
            files,
            source_dir: source_dir.into(),
        }
    }

    /// Wire an importer to SQLx repositories and the local public directory
    pub fn from_pool(pool: DynDatabasePool, config: &ContentConfig) -> Self {
        Self::new(
            EntityStores::from_pool(pool.clone()),
            CreationLog::new(SqlxStateRepository::boxed(pool), config.state_key.clone()),
            Arc::new(PublicDirectoryCopier::new(&config.public_dir)),
            &config.source_dir,
        )
    }

    /// Import videos, then pages, then articles.
    ///
    /// Rows that fail are skipped and listed in the report's warnings. An
    /// error is returned only when a source cannot be read or the creation
    /// log cannot be written.
    pub async fn import_content(&self) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();

        self.import_videos(&mut report).await?;
        self.import_pages(&mut report).await?;
        self.import_articles(&mut report).await?;

        tracing::info!("Demo content import finished: {}", report);
        Ok(report)
    }

    async fn import_articles(&self, report: &mut ImportReport) -> Result<(), ImportError> {
        self.import_source(ContentKind::Article, ARTICLES_CSV, report)
            .await
    }

    async fn import_videos(&self, report: &mut ImportReport) -> Result<(), ImportError> {
        self.import_source(ContentKind::Video, VIDEOS_CSV, report).await
    }

    async fn import_pages(&self, report: &mut ImportReport) -> Result<(), ImportError> {
        self.import_source(ContentKind::Page, PAGES_CSV, report).await
    }

    async fn import_source(
        &self,
        kind: ContentKind,
        file_name: &str,
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        let path = self.source_dir.join(file_name);

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{}, skipping {} import", ImportError::MissingSourceFile(path.clone()), kind);
                report.skipped_sources.push(path);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_slice());
        let headers = reader.headers()?.clone();

        if !headers.iter().any(|name| name.trim() == "title") {
            tracing::warn!("{}, skipping {} import", ImportError::MissingTitleColumn(path.clone()), kind);
            report.skipped_sources.push(path);
            return Ok(());
        }

        tracing::info!("Importing {}s from {}", kind, path.display());

        // Flushed even when a record fails fatally, so nothing persisted so
        // far goes unrecorded.
        let mut created = BTreeMap::new();
        let mut record = StringRecord::new();
        let outcome = loop {
            let line = match reader.read_record(&mut record) {
                Ok(true) => record.position().map(|p| p.line()).unwrap_or_default(),
                Ok(false) => break Ok(()),
                // The record is consumed, so the pass can move on to the next one
                Err(e) => match e.kind() {
                    csv::ErrorKind::Utf8 { pos, err } => {
                        let line = pos.as_ref().map(|p| p.line()).unwrap_or_default();
                        let e = ImportError::InvalidEncoding {
                            line,
                            field: err.field() + 1,
                        };
                        report.skip_row(&path, line, &e);
                        continue;
                    }
                    _ => break Err(ImportError::from(e)),
                },
            };

            match self.import_row(kind, &headers, &record, line).await {
                Ok(item) => {
                    tracing::debug!("Created {} '{}' ({})", kind, item.title, item.uuid);
                    created.insert(item.uuid, EntityType::Node);
                    report.count_created(kind);
                }
                Err(e) if e.is_row_scoped() => report.skip_row(&path, line, &e),
                Err(e) => break Err(e),
            }
        };

        self.log
            .record(&created)
            .await
            .map_err(ImportError::StateLog)?;
        outcome
    }

    async fn import_row(
        &self,
        kind: ContentKind,
        headers: &StringRecord,
        record: &StringRecord,
        line: u64,
    ) -> Result<ContentItem, ImportError> {
        let row = ImportRow::from_record(headers, record, line)?;
        let item = self.build_item(kind, &row).await?;

        self.stores
            .nodes
            .create(&item)
            .await
            .map_err(ImportError::Persistence)
    }

    /// Map a row onto a creation request, resolving the entities it refers to
    async fn build_item(
        &self,
        kind: ContentKind,
        row: &ImportRow,
    ) -> Result<NewContentItem, ImportError> {
        let mut item = NewContentItem::new(kind, row.title());

        if let Some(body) = row.get("body") {
            item = item.with_body(Body::full_html(body));
        }

        if let Some(slug) = row.get("slug") {
            item = item.with_slug(slug);
        }

        if kind == ContentKind::Article {
            if let Some(tags) = row.get("tags") {
                let mut term_ids = Vec::new();
                for name in tags.split(',').map(str::trim).filter(|name| !name.is_empty()) {
                    term_ids.push(self.get_term(name, TAGS_VOCABULARY).await?);
                }
                item = item.with_tags(term_ids);
            }
        }

        if let Some(author) = row.get("author") {
            item = item.with_owner(self.get_user(author).await?);
        }

        if kind == ContentKind::Article {
            if let Some(image) = row.get("image") {
                let path = self.source_dir.join(IMAGES_DIR).join(image);
                let file_id = self.create_file_entity(&path).await?;
                item = item.with_image(file_id, row.get("alt").unwrap_or_default());
            }
        }

        if kind == ContentKind::Video {
            if let Some(video) = row.get("video") {
                item = item.with_video(video);
            }
        }

        Ok(item)
    }

    /// Look up a user by exact name, creating an enabled account without
    /// credentials if there is none. Returns the user ID.
    pub async fn get_user(&self, name: &str) -> Result<i64, ImportError> {
        let users = &self.stores.users;

        if let Some(user) = users
            .get_by_name(name)
            .await
            .map_err(ImportError::Persistence)?
        {
            return Ok(user.id);
        }

        let user = users
            .create(&CreateUserInput::enabled(name))
            .await
            .map_err(ImportError::Persistence)?;
        self.log
            .record_one(&user.uuid, EntityType::User)
            .await
            .map_err(ImportError::StateLog)?;

        tracing::debug!("Created user '{}'", user.name);
        Ok(user.id)
    }

    /// Look up a term by name within `vocabulary`, creating it with an alias
    /// if there is none. Returns the term ID.
    pub async fn get_term(&self, name: &str, vocabulary: &str) -> Result<i64, ImportError> {
        let name = name.trim();
        let terms = &self.stores.terms;

        if let Some(term) = terms
            .get_by_name(name, vocabulary)
            .await
            .map_err(ImportError::Persistence)?
        {
            return Ok(term.id);
        }

        let input = CreateTermInput {
            name: name.to_string(),
            vocabulary: vocabulary.to_string(),
            alias: Some(term_alias(vocabulary, name)),
        };
        let term = terms
            .create(&input)
            .await
            .map_err(ImportError::Persistence)?;
        self.log
            .record_one(&term.uuid, EntityType::TaxonomyTerm)
            .await
            .map_err(ImportError::StateLog)?;

        tracing::debug!("Created term '{}' in '{}'", term.name, term.vocabulary);
        Ok(term.id)
    }

    /// Copy `path` into public storage and create a file entity for the
    /// copy. Returns the file ID.
    pub async fn create_file_entity(&self, path: &Path) -> Result<i64, ImportError> {
        let uri = self
            .files
            .copy_replace(path)
            .await
            .map_err(|source| ImportError::FileCopy {
                path: path.to_path_buf(),
                source,
            })?;

        let file = self
            .stores
            .files
            .create(&uri)
            .await
            .map_err(ImportError::Persistence)?;
        self.log
            .record_one(&file.uuid, EntityType::File)
            .await
            .map_err(ImportError::StateLog)?;

        tracing::debug!("Created file {}", file.uri);
        Ok(file.id)
    }

    /// Delete every entity recorded in the creation log.
    ///
    /// Entities are grouped by type and each group is loaded and deleted in
    /// bulk; recorded UUIDs that no longer resolve are skipped. Deleting a
    /// file entity also removes its public copy. Once a group
    /// is deleted its entries are dropped from the log, so calling this twice
    /// is a no-op the second time. Entries with an unrecognised type are left
    /// in the log.
    pub async fn delete_imported_content(&self) -> Result<DeleteReport, ImportError> {
        let grouped = self.log.grouped().await.map_err(ImportError::StateLog)?;
        let mut report = DeleteReport::default();

        for (entity_type, uuids) in &grouped.by_type {
            let entities = self
                .stores
                .load_by_uuids(*entity_type, uuids)
                .await
                .map_err(ImportError::Persistence)?;
            if *entity_type == EntityType::File {
                report.removed_files += self.remove_public_copies(&entities).await?;
            }
            let deleted = self
                .stores
                .delete(*entity_type, &entities)
                .await
                .map_err(ImportError::Persistence)?;

            self.log
                .forget(uuids)
                .await
                .map_err(ImportError::StateLog)?;

            tracing::info!(
                "Deleted {} {} entit(ies), {} already gone",
                deleted,
                entity_type,
                uuids.len().saturating_sub(entities.len())
            );
            report.stale += uuids.len().saturating_sub(entities.len());
            report.deleted.insert(*entity_type, deleted);
        }

        for (uuid, type_name) in &grouped.unknown {
            tracing::warn!(
                "Leaving {} in '{}': unknown entity type '{}'",
                uuid,
                self.log.key(),
                type_name
            );
        }
        report.unknown = grouped.unknown;

        tracing::info!("Demo content removal finished: {}", report);
        Ok(report)
    }

    /// Remove the stored copies behind file entities. Copies that are
    /// already gone are skipped.
    async fn remove_public_copies(&self, files: &[EntityRef]) -> Result<usize, ImportError> {
        let mut removed = 0;
        for file in files {
            let Some(managed) = self
                .stores
                .files
                .get_by_id(file.id)
                .await
                .map_err(ImportError::Persistence)?
            else {
                continue;
            };

            if self
                .files
                .remove(&managed.uri)
                .await
                .map_err(|source| ImportError::FileRemove {
                    uri: managed.uri.clone(),
                    source,
                })?
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
