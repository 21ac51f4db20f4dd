//! Cache store: artifact file lifecycle
//!
//! Owns every artifact file in the cache directory: path layout,
//! existence checks, loading, stale-build cleanup and atomic writes.
//! The store is injected into the orchestrator rather than held as
//! process-wide state, and carries the per-group lock registry.

use crate::cache::lock::GroupLocks;
use crate::error::{AssetCacheError, AssetCacheResult};
use crate::request::AssetGroupRequest;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use uuid::Uuid;

/// Write bytes to a path via a same-directory temp file and rename
///
/// Rename within one directory is atomic on POSIX filesystems, so a
/// concurrent reader sees either the old file or the complete new one,
/// never a truncated write.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> AssetCacheResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AssetCacheError::Internal(format!("no file name in {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&tmp, bytes)
        .await
        .map_err(|e| AssetCacheError::io(format!("writing temp file {}", tmp.display()), e))?;

    if let Err(e) = fs::rename(&tmp, path).await {
        // Leave nothing behind on failure
        let _ = fs::remove_file(&tmp).await;
        return Err(AssetCacheError::io(
            format!("renaming {} into place", path.display()),
            e,
        ));
    }

    Ok(())
}

/// Handle to the on-disk cache directory
#[derive(Debug)]
pub struct CacheStore {
    dir: PathBuf,
    locks: GroupLocks,
}

impl CacheStore {
    /// Create a store rooted at the given cache directory
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            locks: GroupLocks::new(),
        }
    }

    /// The cache directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the manifest document for a group
    pub fn manifest_path(&self, group_id: &str) -> PathBuf {
        self.dir.join(format!("{group_id}.json"))
    }

    /// Path of the plain built artifact for a request
    pub fn artifact_path(&self, request: &AssetGroupRequest) -> PathBuf {
        self.dir.join(request.artifact_name())
    }

    /// Path of the gzip-encoded artifact for a request
    pub fn gzip_path(&self, request: &AssetGroupRequest) -> PathBuf {
        self.dir.join(format!("{}.gz", request.artifact_name()))
    }

    /// Verify the cache directory exists and accepts writes
    ///
    /// Probed before any build attempt so a request never gets halfway
    /// through compilation only to fail at persist time.
    pub async fn ensure_writable(&self) -> AssetCacheResult<()> {
        let unwritable = |reason: String| AssetCacheError::CacheDirUnwritable {
            path: self.dir.clone(),
            reason,
        };

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| unwritable(e.to_string()))?;

        let probe = self.dir.join(format!(".probe.{}", Uuid::new_v4()));
        fs::write(&probe, b"")
            .await
            .map_err(|e| unwritable(e.to_string()))?;
        fs::remove_file(&probe)
            .await
            .map_err(|e| unwritable(e.to_string()))?;

        Ok(())
    }

    /// Whether the exact artifact for this request is already built
    pub fn artifact_exists(&self, request: &AssetGroupRequest) -> bool {
        self.artifact_path(request).is_file()
    }

    /// Load the plain and gzip bytes of a built artifact
    pub async fn load_artifact(
        &self,
        request: &AssetGroupRequest,
    ) -> AssetCacheResult<(Vec<u8>, Vec<u8>)> {
        let plain_path = self.artifact_path(request);
        let plain = fs::read(&plain_path)
            .await
            .map_err(|e| AssetCacheError::io(format!("reading artifact {}", plain_path.display()), e))?;

        let gzip_path = self.gzip_path(request);
        let gzip = fs::read(&gzip_path)
            .await
            .map_err(|e| AssetCacheError::io(format!("reading artifact {}", gzip_path.display()), e))?;

        Ok((plain, gzip))
    }

    /// Delete every stale build belonging to a group
    ///
    /// Any entry named `{group_id}-...` is a build for some other
    /// cache buster and is about to be superseded. The manifest
    /// (`{group_id}.json`) carries no dash after the id and survives.
    pub async fn clean_group(&self, group_id: &str) -> AssetCacheResult<usize> {
        let prefix = format!("{group_id}-");
        let mut removed = 0;

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| AssetCacheError::io(format!("reading cache dir {}", self.dir.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AssetCacheError::io("reading cache dir entry", e))?
        {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&prefix) {
                let path = entry.path();
                debug!("Removing stale build: {}", path.display());
                fs::remove_file(&path)
                    .await
                    .map_err(|e| AssetCacheError::io(format!("removing {}", path.display()), e))?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Acquire the advisory lock for a group
    pub async fn lock(&self, group_id: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(group_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AssetType;
    use tempfile::TempDir;

    fn request(group_id: &str, buster: &str) -> AssetGroupRequest {
        AssetGroupRequest {
            group_id: group_id.to_string(),
            cache_buster: buster.to_string(),
            asset_type: AssetType::Css,
        }
    }

    #[tokio::test]
    async fn write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artifact.min.css");

        write_atomic(&path, b"body{}").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"body{}");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["artifact.min.css"]);
    }

    #[tokio::test]
    async fn write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artifact.min.css");

        write_atomic(&path, b"old").await.unwrap();
        write_atomic(&path, b"new").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn paths_follow_layout() {
        let store = CacheStore::new(PathBuf::from("/srv/cache"));
        let req = request("abc", "1368338917");

        assert_eq!(
            store.manifest_path("abc"),
            PathBuf::from("/srv/cache/abc.json")
        );
        assert_eq!(
            store.artifact_path(&req),
            PathBuf::from("/srv/cache/abc-1368338917.min.css")
        );
        assert_eq!(
            store.gzip_path(&req),
            PathBuf::from("/srv/cache/abc-1368338917.min.css.gz")
        );
    }

    #[tokio::test]
    async fn ensure_writable_creates_dir() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().join("cache"));

        store.ensure_writable().await.unwrap();
        assert!(dir.path().join("cache").is_dir());
    }

    #[tokio::test]
    async fn ensure_writable_rejects_non_directory() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("cache");
        std::fs::write(&cache, b"not a directory").unwrap();

        let store = CacheStore::new(cache);
        let err = store.ensure_writable().await.unwrap_err();
        assert!(matches!(err, AssetCacheError::CacheDirUnwritable { .. }));
    }

    #[tokio::test]
    async fn clean_group_removes_only_matching_builds() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf());

        for name in [
            "abc.json",
            "abc-1.min.css",
            "abc-1.min.css.gz",
            "abc-2.min.css",
            "xyz-1.min.css",
            "xyz.json",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let removed = store.clean_group("abc").await.unwrap();
        assert_eq!(removed, 3);

        assert!(dir.path().join("abc.json").exists());
        assert!(dir.path().join("xyz-1.min.css").exists());
        assert!(dir.path().join("xyz.json").exists());
        assert!(!dir.path().join("abc-1.min.css").exists());
        assert!(!dir.path().join("abc-1.min.css.gz").exists());
        assert!(!dir.path().join("abc-2.min.css").exists());
    }

    #[tokio::test]
    async fn artifact_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf());
        let req = request("abc", "1");

        assert!(!store.artifact_exists(&req));

        write_atomic(&store.artifact_path(&req), b"plain").await.unwrap();
        write_atomic(&store.gzip_path(&req), b"gz").await.unwrap();

        assert!(store.artifact_exists(&req));
        let (plain, gzip) = store.load_artifact(&req).await.unwrap();
        assert_eq!(plain, b"plain");
        assert_eq!(gzip, b"gz");
    }
}
