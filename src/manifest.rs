//! Group manifest persistence
//!
//! One JSON document per group (`{group_id}.json` in the cache
//! directory) records the ordered member list with content digests,
//! plus two fields that ride along unchanged through every rebuild:
//! the group digest (fingerprint of the declared member set) and the
//! cache buster active when the manifest was last written.
//!
//! Member order is load-bearing: it is the concatenation order of the
//! built artifact.

use crate::cache::write_atomic;
use crate::error::{AssetCacheError, AssetCacheResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// One member file of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File path relative to the asset base directory
    pub path: String,

    /// Content digest of the file at last build
    pub digest: String,
}

/// Persisted description of an asset group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupManifest {
    /// Ordered member list; concatenation order of the artifact.
    /// Rebuilds append transitively-imported stylesheets here.
    pub members: Vec<ManifestEntry>,

    /// Fingerprint of the declared member set; opaque, carried
    /// through rebuilds byte-for-byte
    pub group_digest: String,

    /// Busting token active when this manifest was last written
    pub cache_buster: String,
}

impl GroupManifest {
    /// Create an empty manifest carrying the given control fields
    pub fn new(group_digest: impl Into<String>, cache_buster: impl Into<String>) -> Self {
        Self {
            members: Vec::new(),
            group_digest: group_digest.into(),
            cache_buster: cache_buster.into(),
        }
    }

    /// Record a member digest, preserving first-seen order
    ///
    /// A path already present has its digest updated in place; a new
    /// path is appended. Imports discovered mid-build therefore extend
    /// membership without disturbing concatenation order.
    pub fn insert(&mut self, path: impl Into<String>, digest: impl Into<String>) {
        let path = path.into();
        let digest = digest.into();
        match self.members.iter_mut().find(|m| m.path == path) {
            Some(entry) => entry.digest = digest,
            None => self.members.push(ManifestEntry { path, digest }),
        }
    }

    /// Look up a member's digest
    pub fn digest_of(&self, path: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.path == path)
            .map(|m| m.digest.as_str())
    }
}

/// Reads and writes group manifests in the cache directory
///
/// Exclusively owns manifest lifecycle; nothing else touches the
/// `{group_id}.json` documents.
#[derive(Debug)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    /// Create a store rooted at the given cache directory
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the manifest document for a group
    pub fn path(&self, group_id: &str) -> PathBuf {
        self.dir.join(format!("{group_id}.json"))
    }

    /// Whether a group has been declared
    pub fn exists(&self, group_id: &str) -> bool {
        self.path(group_id).is_file()
    }

    /// Load a group's manifest
    ///
    /// A group must be declared before it can be built: an absent
    /// document is `MissingManifest`, an unparsable one is
    /// `CorruptManifest`, never silently repaired.
    pub async fn load(&self, group_id: &str) -> AssetCacheResult<GroupManifest> {
        let path = self.path(group_id);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetCacheError::MissingManifest(group_id.to_string()));
            }
            Err(e) => {
                return Err(AssetCacheError::io(
                    format!("reading manifest {}", path.display()),
                    e,
                ));
            }
        };

        serde_json::from_str(&content).map_err(|e| AssetCacheError::CorruptManifest {
            group_id: group_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Overwrite a group's manifest atomically
    pub async fn save(&self, group_id: &str, manifest: &GroupManifest) -> AssetCacheResult<()> {
        let content = serde_json::to_string_pretty(manifest)?;
        write_atomic(&self.path(group_id), content.as_bytes()).await
    }

    /// List all declared group ids
    pub async fn list(&self) -> AssetCacheResult<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(vec![]);
        }

        let mut groups = vec![];
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| AssetCacheError::io(format!("reading cache dir {}", self.dir.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AssetCacheError::io("reading cache dir entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    groups.push(stem.to_string());
                }
            }
        }

        groups.sort();
        Ok(groups)
    }

    /// The cache directory this store reads from
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
