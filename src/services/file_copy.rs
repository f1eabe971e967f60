//! Copying bundled files into public storage
//!
//! A copied file keeps its base name. Whatever already sits at the
//! destination is replaced; no collision renaming happens.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::PUBLIC_SCHEME;

/// Copy-with-overwrite into a public namespace
#[async_trait]
pub trait FileCopier: Send + Sync {
    /// Copy `source` and return the public URI of the copy
    async fn copy_replace(&self, source: &Path) -> std::io::Result<String>;

    /// Remove the file behind a public URI. Returns `false` when there was
    /// nothing to remove.
    async fn remove(&self, uri: &str) -> std::io::Result<bool>;
}

/// Copies into a directory on the local filesystem exposed as `public://`
pub struct PublicDirectoryCopier {
    public_dir: PathBuf,
}

impl PublicDirectoryCopier {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    /// Filesystem path of a `public://` URI
    pub fn resolve(&self, uri: &str) -> Option<PathBuf> {
        uri.strip_prefix(PUBLIC_SCHEME)
            .map(|name| self.public_dir.join(name))
    }
}

#[async_trait]
impl FileCopier for PublicDirectoryCopier {
    async fn copy_replace(&self, source: &Path) -> std::io::Result<String> {
        let file_name = source.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no file name", source.display()),
            )
        })?;

        if !self.public_dir.exists() {
            fs::create_dir_all(&self.public_dir).await?;
        }

        let destination = self.public_dir.join(file_name);
        fs::copy(source, &destination).await?;
        tracing::debug!("Copied {} to {}", source.display(), destination.display());

        Ok(format!("{}{}", PUBLIC_SCHEME, file_name.to_string_lossy()))
    }

    async fn remove(&self, uri: &str) -> std::io::Result<bool> {
        let Some(path) = self.resolve(uri) else {
            tracing::debug!("Not removing {}: outside public storage", uri);
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_creates_public_dir() {
        let source_dir = tempfile::tempdir().unwrap();
        let public_root = tempfile::tempdir().unwrap();
        let public_dir = public_root.path().join("files");
        let source = source_dir.path().join("hero.jpg");
        std::fs::write(&source, b"jpeg").unwrap();

        let copier = PublicDirectoryCopier::new(&public_dir);
        let uri = copier.copy_replace(&source).await.unwrap();

        assert_eq!(uri, "public://hero.jpg");
        assert_eq!(std::fs::read(public_dir.join("hero.jpg")).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn test_copy_overwrites_existing_file() {
        let source_dir = tempfile::tempdir().unwrap();
        let public_dir = tempfile::tempdir().unwrap();
        std::fs::write(public_dir.path().join("hero.jpg"), b"old").unwrap();
        let source = source_dir.path().join("hero.jpg");
        std::fs::write(&source, b"new").unwrap();

        let copier = PublicDirectoryCopier::new(public_dir.path());
        let uri = copier.copy_replace(&source).await.unwrap();

        assert_eq!(uri, "public://hero.jpg");
        assert_eq!(std::fs::read(public_dir.path().join("hero.jpg")).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(public_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let public_dir = tempfile::tempdir().unwrap();
        let copier = PublicDirectoryCopier::new(public_dir.path());

        let err = copier
            .copy_replace(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_remove_deletes_public_copy() {
        let source_dir = tempfile::tempdir().unwrap();
        let public_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("hero.jpg");
        std::fs::write(&source, b"jpeg").unwrap();

        let copier = PublicDirectoryCopier::new(public_dir.path());
        let uri = copier.copy_replace(&source).await.unwrap();

        assert!(copier.remove(&uri).await.unwrap());
        assert!(!public_dir.path().join("hero.jpg").exists());
        assert!(source.exists());

        // Already gone
        assert!(!copier.remove(&uri).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_ignores_other_schemes() {
        let public_dir = tempfile::tempdir().unwrap();
        let copier = PublicDirectoryCopier::new(public_dir.path());

        assert!(!copier.remove("private://hero.jpg").await.unwrap());
    }

    #[test]
    fn test_resolve_public_uri() {
        let copier = PublicDirectoryCopier::new("/srv/public");
        assert_eq!(
            copier.resolve("public://a.png"),
            Some(PathBuf::from("/srv/public/a.png"))
        );
        assert_eq!(copier.resolve("private://a.png"), None);
    }
}
