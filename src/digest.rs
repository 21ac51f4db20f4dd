//! Content digests for cache validity
//!
//! Every member file recorded in a group manifest carries the SHA256
//! hex digest of its bytes. Same bytes = same digest = cache still
//! valid.

use crate::error::{AssetCacheError, AssetCacheResult};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Hash a byte slice, returning the full lowercase hex digest
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash a file's contents on disk
///
/// A missing file maps to `MissingAsset`: a member that cannot be
/// hashed cannot be built either.
pub async fn digest_file(path: &Path) -> AssetCacheResult<String> {
    let contents = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssetCacheError::MissingAsset(path.to_path_buf())
        } else {
            AssetCacheError::io(format!("reading asset {}", path.display()), e)
        }
    })?;
    Ok(digest(&contents))
}
