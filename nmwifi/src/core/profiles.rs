//! File-backed connection profile store.
//!
//! NetworkManager persists profiles as keyfiles in a system directory. The
//! manager only ever needs to know whether the directory holds anything and
//! to wipe it, so the store exposes exactly those two operations.

use async_trait::async_trait;
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Result;

/// Enumerate-and-clear access to persisted connection profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Lists the entries currently in the store.
    async fn entries(&self) -> Result<Vec<PathBuf>>;

    /// Removes every entry from the store.
    async fn clear(&self) -> Result<()>;
}

/// [`ProfileStore`] over a directory of keyfiles.
///
/// A missing directory is treated as an empty store.
#[derive(Debug, Clone)]
pub struct DirProfileStore {
    dir: PathBuf,
}

impl DirProfileStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ProfileStore for DirProfileStore {
    async fn entries(&self) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Profile directory {} does not exist", self.dir.display());
                return Ok(entries);
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            entries.push(entry.path());
        }
        Ok(entries)
    }

    async fn clear(&self) -> Result<()> {
        let mut removed = 0usize;
        for path in self.entries().await? {
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Profile {} vanished before removal", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("Failed to remove profile {}: {e}", path.display());
                    return Err(e.into());
                }
            }
        }
        debug!(
            "Removed {removed} profile file(s) from {}",
            self.dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirProfileStore::new(tmp.path().join("absent"));
        assert!(store.entries().await.unwrap().is_empty());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn clear_removes_files_only() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Home.nmconnection"), "[connection]").unwrap();
        std::fs::write(tmp.path().join("Cafe.nmconnection"), "[connection]").unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();

        let store = DirProfileStore::new(tmp.path());
        assert_eq!(store.entries().await.unwrap().len(), 3);

        store.clear().await.unwrap();
        let left = store.entries().await.unwrap();
        assert_eq!(left, vec![tmp.path().join("nested")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn clear_skips_entries_that_disappear() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Home.nmconnection"), "[connection]").unwrap();
        // Dangling link: listed by read_dir, NotFound on metadata
        std::os::unix::fs::symlink(
            tmp.path().join("gone.nmconnection"),
            tmp.path().join("stale.nmconnection"),
        )
        .unwrap();
        std::fs::write(tmp.path().join("Cafe.nmconnection"), "[connection]").unwrap();

        let store = DirProfileStore::new(tmp.path());
        store.clear().await.unwrap();

        let left = store.entries().await.unwrap();
        assert_eq!(left, vec![tmp.path().join("stale.nmconnection")]);
    }
}
