//! Removal of the derived files image cache records point to.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use ::async_trait::async_trait;

/// What happened to an artifact on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRemoval {
    Removed,
    /// Nothing at the path; already gone.
    Missing,
    /// Path refused or removal failed. Logged, never surfaced.
    Skipped,
}

/// Storage for cached renditions.
///
/// Removal is best effort: a record delete never fails because its file
/// could not be removed.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn remove(&self, relative_path: &str) -> ArtifactRemoval;
}

/// Artifacts as files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `relative_path` onto the root. `None` for empty, absolute or
    /// `..`-bearing paths.
    pub fn resolve(&self, relative_path: &str) -> Option<PathBuf> {
        let relative = Path::new(relative_path.trim());
        if relative.as_os_str().is_empty() {
            return None;
        }
        let mut has_normal = false;
        for component in relative.components() {
            match component {
                Component::Normal(_) => has_normal = true,
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        has_normal.then(|| self.root.join(relative))
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn remove(&self, relative_path: &str) -> ArtifactRemoval {
        let Some(full) = self.resolve(relative_path) else {
            tracing::warn!(path = %relative_path, "Refusing to remove artifact outside root");
            return ArtifactRemoval::Skipped;
        };

        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(path = %full.display(), "Removed image cache artifact");
                ArtifactRemoval::Removed
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                tracing::debug!(path = %full.display(), "Image cache artifact already gone");
                ArtifactRemoval::Missing
            }
            Err(e) => {
                tracing::warn!(path = %full.display(), error = %e, "Failed to remove image cache artifact");
                ArtifactRemoval::Skipped
            }
        }
    }
}

/// For deployments whose records have no files behind them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopArtifactStore;

#[async_trait]
impl ArtifactStore for NoopArtifactStore {
    async fn remove(&self, _relative_path: &str) -> ArtifactRemoval {
        ArtifactRemoval::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_escapes() {
        let store = LocalArtifactStore::new("/srv/tank");
        assert_eq!(
            store.resolve("alice/cache/a.png"),
            Some(PathBuf::from("/srv/tank/alice/cache/a.png"))
        );
        assert_eq!(store.resolve("../etc/passwd"), None);
        assert_eq!(store.resolve("alice/../../x"), None);
        assert_eq!(store.resolve("/etc/passwd"), None);
        assert_eq!(store.resolve(""), None);
        assert_eq!(store.resolve("."), None);
    }

    #[tokio::test]
    async fn test_remove_existing_then_missing() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("alice"))?;
        std::fs::write(dir.path().join("alice/a.png"), b"png")?;

        let store = LocalArtifactStore::new(dir.path());
        assert_eq!(store.remove("alice/a.png").await, ArtifactRemoval::Removed);
        assert!(!dir.path().join("alice/a.png").exists());
        assert_eq!(store.remove("alice/a.png").await, ArtifactRemoval::Missing);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_outside_root_leaves_file() -> std::io::Result<()> {
        let outer = tempfile::tempdir()?;
        let root = outer.path().join("root");
        std::fs::create_dir_all(&root)?;
        std::fs::write(outer.path().join("keep.png"), b"png")?;

        let store = LocalArtifactStore::new(&root);
        assert_eq!(store.remove("../keep.png").await, ArtifactRemoval::Skipped);
        assert!(outer.path().join("keep.png").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_noop_store() {
        assert_eq!(NoopArtifactStore.remove("x.png").await, ArtifactRemoval::Skipped);
    }
}
