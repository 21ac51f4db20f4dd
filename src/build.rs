//! Build orchestration
//!
//! The request path through the cache:
//!
//! ```text
//! CheckCache ──hit──> load artifact ─────────────────────> Serve
//!     │
//!    miss
//!     ▼
//!   Clean ──> Compile+Minify (per member, in order) ──> Persist ──> Serve
//! ```
//!
//! The whole miss path runs under the group's advisory lock. Any
//! failure aborts the request with the cache exactly as it was: the
//! manifest and artifacts are only written after every member built.

use crate::adapters::{Adapters, Minifier, StylesheetCompiler};
use crate::cache::{write_atomic, CacheStore};
use crate::digest::digest_file;
use crate::error::{AssetCacheError, AssetCacheResult};
use crate::manifest::{GroupManifest, ManifestStore};
use crate::request::{AssetGroupRequest, AssetType, StylesheetKind};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Separator between per-member chunks in the concatenated artifact
const CHUNK_SEPARATOR: &str = "\n\n";

/// How a member participates in the build, resolved once from its
/// file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    /// Less source: compile, then minify
    Less,
    /// Sass source: compile, then minify
    Sass,
    /// Already minified: copied through verbatim
    PreMinified,
    /// Plain source: minify only
    Plain,
}

impl MemberKind {
    fn resolve(path: &str) -> Self {
        let extension = Path::new(path)
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        match extension.as_str() {
            "less" => Self::Less,
            "scss" => Self::Sass,
            _ if path.contains(".min.") => Self::PreMinified,
            _ => Self::Plain,
        }
    }
}

/// A built (or cache-loaded) artifact, both encodings
#[derive(Debug, Clone)]
pub struct BuiltArtifact {
    pub asset_type: AssetType,
    pub plain: Vec<u8>,
    pub gzip: Vec<u8>,
}

/// Result of handling a group request
#[derive(Debug)]
pub struct BuildOutcome {
    pub artifact: BuiltArtifact,

    /// True when the artifact came straight off disk
    pub cache_hit: bool,
}

/// Drives compilation, minification, concatenation and persistence
/// for asset group requests
///
/// All collaborators are injected: the store owns artifact files, the
/// manifest store owns group documents, and the adapters do the
/// actual compiling and minifying.
pub struct BuildOrchestrator {
    base_dir: PathBuf,
    store: CacheStore,
    manifests: ManifestStore,
    adapters: Adapters,
}

impl BuildOrchestrator {
    /// Create an orchestrator over the given stores and adapters
    pub fn new(
        base_dir: PathBuf,
        store: CacheStore,
        manifests: ManifestStore,
        adapters: Adapters,
    ) -> Self {
        Self {
            base_dir,
            store,
            manifests,
            adapters,
        }
    }

    /// The asset base directory member paths resolve under
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The cache store backing this orchestrator
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// The manifest store backing this orchestrator
    pub fn manifests(&self) -> &ManifestStore {
        &self.manifests
    }

    fn compiler_for(&self, kind: StylesheetKind) -> &dyn StylesheetCompiler {
        match kind {
            StylesheetKind::Less => self.adapters.less.as_ref(),
            StylesheetKind::Sass => self.adapters.sass.as_ref(),
        }
    }

    fn minifier_for(&self, asset_type: AssetType) -> &dyn Minifier {
        match asset_type {
            AssetType::Css => self.adapters.css_minifier.as_ref(),
            AssetType::Js => self.adapters.js_minifier.as_ref(),
        }
    }

    /// Handle a group request: serve from cache or rebuild
    pub async fn handle(&self, request: &AssetGroupRequest) -> AssetCacheResult<BuildOutcome> {
        self.store.ensure_writable().await?;

        // Serializes clean/persist against concurrent misses for the
        // same group; hits take the lock too so they never read files
        // mid-replacement.
        let _guard = self.store.lock(&request.group_id).await;

        if self.store.artifact_exists(request) {
            debug!("Cache hit for {}", request.artifact_name());
            let (plain, gzip) = self.store.load_artifact(request).await?;
            return Ok(BuildOutcome {
                artifact: BuiltArtifact {
                    asset_type: request.asset_type,
                    plain,
                    gzip,
                },
                cache_hit: true,
            });
        }

        info!("Cache miss for {}, building", request.artifact_name());
        let removed = self.store.clean_group(&request.group_id).await?;
        if removed > 0 {
            debug!("Removed {} stale build file(s)", removed);
        }

        let manifest = self.manifests.load(&request.group_id).await?;
        let (output, rebuilt) = self.build_members(request, &manifest).await?;

        let plain = output.into_bytes();
        let gzip = gzip_encode(&plain)?;

        write_atomic(&self.store.artifact_path(request), &plain).await?;
        write_atomic(&self.store.gzip_path(request), &gzip).await?;
        self.manifests.save(&request.group_id, &rebuilt).await?;

        info!(
            "Built {} ({} bytes, {} gzipped)",
            request.artifact_name(),
            plain.len(),
            gzip.len()
        );

        Ok(BuildOutcome {
            artifact: BuiltArtifact {
                asset_type: request.asset_type,
                plain,
                gzip,
            },
            cache_hit: false,
        })
    }

    /// Run the per-member build loop, producing the concatenated
    /// output and the rebuilt manifest
    ///
    /// Members build in manifest order and the output is their ordered
    /// concatenation; imports discovered along the way extend the
    /// rebuilt membership but never the output. The group digest and
    /// cache buster carry through from the loaded manifest unchanged.
    async fn build_members(
        &self,
        request: &AssetGroupRequest,
        manifest: &GroupManifest,
    ) -> AssetCacheResult<(String, GroupManifest)> {
        let mut rebuilt = GroupManifest::new(&manifest.group_digest, &manifest.cache_buster);
        let mut output = String::new();

        for member in &manifest.members {
            let absolute = self.base_dir.join(&member.path);
            rebuilt.insert(&member.path, digest_file(&absolute).await?);

            let chunk = match MemberKind::resolve(&member.path) {
                MemberKind::Less => {
                    self.compile_member(request, &absolute, StylesheetKind::Less, &mut rebuilt)
                        .await?
                }
                MemberKind::Sass => {
                    self.compile_member(request, &absolute, StylesheetKind::Sass, &mut rebuilt)
                        .await?
                }
                MemberKind::PreMinified => read_asset(&absolute).await?,
                MemberKind::Plain => {
                    let data = read_asset(&absolute).await?;
                    self.minifier_for(request.asset_type).minify(&data).await?
                }
            };

            output.push_str(&chunk);
            output.push_str(CHUNK_SEPARATOR);
        }

        Ok((output, rebuilt))
    }

    /// Compile one stylesheet member, record its imports, minify
    async fn compile_member(
        &self,
        request: &AssetGroupRequest,
        absolute: &Path,
        kind: StylesheetKind,
        rebuilt: &mut GroupManifest,
    ) -> AssetCacheResult<String> {
        let source = read_asset(absolute).await?;
        let compile_base = absolute.parent().unwrap_or(&self.base_dir);

        let compiled = self.compiler_for(kind).compile(&source, compile_base).await?;

        for imported in &compiled.imported_files {
            let relative = imported
                .strip_prefix(&self.base_dir)
                .unwrap_or(imported)
                .to_string_lossy()
                .to_string();
            rebuilt.insert(relative, digest_file(imported).await?);
        }

        self.minifier_for(request.asset_type).minify(&compiled.css).await
    }

    /// Compile a single stylesheet on the fly (debug mode)
    ///
    /// Always recompiles, never minifies, never touches the cache.
    pub async fn compile_stylesheet(
        &self,
        path: &Path,
        kind: StylesheetKind,
    ) -> AssetCacheResult<String> {
        let source = read_asset(path).await?;
        let compile_base = path.parent().unwrap_or(&self.base_dir);
        let compiled = self.compiler_for(kind).compile(&source, compile_base).await?;
        Ok(compiled.css)
    }
}

/// Read a member file, mapping absence to `MissingAsset`
async fn read_asset(path: &Path) -> AssetCacheResult<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AssetCacheError::MissingAsset(path.to_path_buf()))
        }
        Err(e) => Err(AssetCacheError::io(
            format!("reading asset {}", path.display()),
            e,
        )),
    }
}

/// Gzip-encode artifact bytes at the default compression level
fn gzip_encode(bytes: &[u8]) -> AssetCacheResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| AssetCacheError::io("gzip-encoding artifact", e))?;
    encoder
        .finish()
        .map_err(|e| AssetCacheError::io("gzip-encoding artifact", e))
}
