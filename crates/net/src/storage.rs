//! The downloaded-works store.

use exn::ResultExt;
use std::path::PathBuf;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// The format a work body is downloaded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkFormat {
    /// Compressed structured format, preferred when the site offers it.
    #[default]
    Fb2,
    /// Raw markup snapshot.
    Html,
}

impl WorkFormat {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Fb2 => ".fb2.zip",
            Self::Html => ".html",
        }
    }
}

/// Expand `~` and make the path absolute.
fn resolve(path: &str) -> Result<PathBuf> {
    if let Some(rest) = path.strip_prefix('~') {
        let home = std::env::var_os("HOME");
        let Some(home) = home else {
            exn::bail!(ErrorKind::InvalidLocation);
        };
        return Ok(PathBuf::from(home).join(rest.trim_start_matches('/')));
    }
    std::path::absolute(path).or_raise(|| ErrorKind::Filesystem(PathBuf::from(path)))
}

/// File store for downloaded work bodies.
///
/// Works land under `<base>/books/<link><suffix>`, with the `/`
/// separators of the stored link translated into path components and
/// any leading separator stripped.
#[derive(Debug, Clone)]
pub struct WorkStorage {
    location: PathBuf,
}

impl WorkStorage {
    pub fn new(location: &str) -> Result<Self> {
        if location.is_empty() {
            exn::bail!(ErrorKind::InvalidLocation);
        }
        Ok(Self { location: resolve(location)?.join("books") })
    }

    /// The path a work with this stored link maps to.
    pub fn path_for(&self, link: &str, format: WorkFormat) -> Result<PathBuf> {
        let mut segments = link.split('/').filter(|segment| !segment.is_empty()).collect::<Vec<_>>();
        let Some(file_name) = segments.pop() else {
            exn::bail!(ErrorKind::InvalidLocation);
        };
        let mut path = self.location.clone();
        for segment in segments {
            path.push(segment);
        }
        path.push(format!("{file_name}{}", format.suffix()));
        Ok(path)
    }

    /// [`path_for`](Self::path_for) with the intermediate directories
    /// created.
    #[instrument(skip(self))]
    pub async fn ensure_path(&self, link: &str, format: WorkFormat) -> Result<PathBuf> {
        let path = self.path_for(link, format)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Filesystem(parent.to_owned()))?;
        }
        Ok(path)
    }

    /// The already-downloaded copy of a work, preferring the compressed
    /// format, if any exists.
    pub async fn find_local(&self, link: &str) -> Option<PathBuf> {
        for format in [WorkFormat::Fb2, WorkFormat::Html] {
            if let Ok(path) = self.path_for(link, format)
                && tokio::fs::try_exists(&path).await.unwrap_or(false)
            {
                return Some(path);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_path_translation() {
        let temp = tempfile::tempdir().unwrap();
        let storage = WorkStorage::new(temp.path().to_str().unwrap()).unwrap();
        let path = storage.path_for("s/sedrik/text_0010", WorkFormat::Fb2).unwrap();
        assert_eq!(path, temp.path().join("books").join("s").join("sedrik").join("text_0010.fb2.zip"));
    }

    #[tokio::test]
    async fn test_leading_separator_is_stripped() {
        let temp = tempfile::tempdir().unwrap();
        let storage = WorkStorage::new(temp.path().to_str().unwrap()).unwrap();
        let with = storage.path_for("/s/sedrik/text_0010", WorkFormat::Html).unwrap();
        let without = storage.path_for("s/sedrik/text_0010", WorkFormat::Html).unwrap();
        assert_eq!(with, without);
    }

    #[tokio::test]
    async fn test_ensure_path_creates_directories() {
        let temp = tempfile::tempdir().unwrap();
        let storage = WorkStorage::new(temp.path().to_str().unwrap()).unwrap();
        let path = storage.ensure_path("s/sedrik/text_0010", WorkFormat::Html).await.unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_find_local_prefers_compressed() {
        let temp = tempfile::tempdir().unwrap();
        let storage = WorkStorage::new(temp.path().to_str().unwrap()).unwrap();
        let html = storage.ensure_path("s/sedrik/text_0010", WorkFormat::Html).await.unwrap();
        tokio::fs::write(&html, b"<html/>").await.unwrap();
        assert_eq!(storage.find_local("s/sedrik/text_0010").await, Some(html.clone()));
        let fb2 = storage.ensure_path("s/sedrik/text_0010", WorkFormat::Fb2).await.unwrap();
        tokio::fs::write(&fb2, b"zip").await.unwrap();
        assert_eq!(storage.find_local("s/sedrik/text_0010").await, Some(fb2));
    }

    #[test]
    fn test_empty_location_is_rejected() {
        assert!(WorkStorage::new("").is_err());
    }
}
