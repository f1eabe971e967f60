//! Import error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while importing or deleting demo content.
///
/// Row-scoped variants (`MalformedRow`, `InvalidEncoding`, `FileCopy`,
/// `Persistence`) skip the row and are reported as warnings. The others abort
/// the whole operation.
#[derive(Debug, Error)]
pub enum ImportError {
    /// CSV source does not exist; the pass is skipped
    #[error("Source file not found: {}", .0.display())]
    MissingSourceFile(PathBuf),

    /// CSV header has no `title` column; the pass is skipped
    #[error("{} has no 'title' column", .0.display())]
    MissingTitleColumn(PathBuf),

    /// Record field count differs from the header
    #[error("Line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Record contains bytes that are not UTF-8
    #[error("Line {line}: field {field} is not valid UTF-8")]
    InvalidEncoding { line: u64, field: usize },

    /// Bundled file could not be copied to public storage
    #[error("Failed to copy {}: {source}", .path.display())]
    FileCopy {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Public copy of a file entity could not be removed
    #[error("Failed to remove {uri}: {source}")]
    FileRemove {
        uri: String,
        source: std::io::Error,
    },

    /// Entity store rejected a create or save
    #[error("Persistence error: {0:#}")]
    Persistence(#[source] anyhow::Error),

    /// Creation log could not be read or written
    #[error("Creation log error: {0:#}")]
    StateLog(#[source] anyhow::Error),

    /// CSV could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Whether this error only affects the row being imported
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            ImportError::MalformedRow { .. }
                | ImportError::InvalidEncoding { .. }
                | ImportError::FileCopy { .. }
                | ImportError::Persistence(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_scoped_errors() {
        let malformed = ImportError::MalformedRow {
            line: 3,
            expected: 4,
            found: 2,
        };
        assert!(malformed.is_row_scoped());
        assert_eq!(malformed.to_string(), "Line 3: expected 4 fields, found 2");

        let encoding = ImportError::InvalidEncoding { line: 3, field: 1 };
        assert!(encoding.is_row_scoped());
        assert_eq!(encoding.to_string(), "Line 3: field 1 is not valid UTF-8");

        let remove = ImportError::FileRemove {
            uri: "public://hero.jpg".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(!remove.is_row_scoped());

        let state = ImportError::StateLog(anyhow::anyhow!("disk full"));
        assert!(!state.is_row_scoped());
        assert!(state.to_string().contains("disk full"));
    }
}
