//! Outcome summaries for import and delete runs

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::ImportError;
use crate::models::{ContentKind, EntityType};

/// A row that was skipped, and why
#[derive(Debug, Clone, Serialize)]
pub struct RowWarning {
    pub source: PathBuf,
    pub line: u64,
    pub message: String,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.source.display(), self.line, self.message)
    }
}

/// Summary of an import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub articles: usize,
    pub videos: usize,
    pub pages: usize,
    /// CSV sources that were not imported (missing file or unusable header)
    pub skipped_sources: Vec<PathBuf>,
    pub warnings: Vec<RowWarning>,
}

impl ImportReport {
    pub(crate) fn count_created(&mut self, kind: ContentKind) {
        match kind {
            ContentKind::Article => self.articles += 1,
            ContentKind::Video => self.videos += 1,
            ContentKind::Page => self.pages += 1,
        }
    }

    /// Log a skipped row and keep it as a warning
    pub(crate) fn skip_row(&mut self, source: &Path, line: u64, error: &ImportError) {
        tracing::warn!("Skipping {} line {}: {}", source.display(), line, error);
        self.warnings.push(RowWarning {
            source: source.to_path_buf(),
            line,
            message: error.to_string(),
        });
    }

    /// Content items created across all passes
    pub fn total_created(&self) -> usize {
        self.articles + self.videos + self.pages
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {} article(s), {} video(s), {} page(s); {} row(s) skipped",
            self.articles,
            self.videos,
            self.pages,
            self.warnings.len()
        )
    }
}

/// Summary of a delete run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteReport {
    /// Rows removed per entity type
    pub deleted: BTreeMap<EntityType, u64>,
    /// Public file copies removed alongside their file entities
    pub removed_files: usize,
    /// Logged UUIDs whose entity no longer existed
    pub stale: usize,
    /// Log entries left in place because their type is not managed here
    pub unknown: Vec<(String, String)>,
}

impl DeleteReport {
    pub fn total_deleted(&self) -> u64 {
        self.deleted.values().sum()
    }
}

impl fmt::Display for DeleteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deleted {} entit(ies)", self.total_deleted())?;
        for (entity_type, count) in &self.deleted {
            write!(f, ", {} {}", count, entity_type)?;
        }
        if self.removed_files > 0 {
            write!(f, "; {} public file(s) removed", self.removed_files)?;
        }
        if self.stale > 0 {
            write!(f, "; {} already gone", self.stale)?;
        }
        Ok(())
    }
}
