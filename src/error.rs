//! Error types for assetcache
//!
//! All modules use `AssetCacheResult<T>` as their return type.
//! Every failure aborts the current request; nothing is retried and
//! no partial cache state is ever left visible on disk.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for assetcache operations
pub type AssetCacheResult<T> = Result<T, AssetCacheError>;

/// All errors that can occur in assetcache
#[derive(Error, Debug)]
pub enum AssetCacheError {
    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Manifest errors
    #[error("Group has not been declared: no manifest for '{0}'")]
    MissingManifest(String),

    #[error("Corrupt manifest for group '{group_id}': {reason}")]
    CorruptManifest { group_id: String, reason: String },

    // Build errors
    #[error("Asset does not exist: {0}")]
    MissingAsset(PathBuf),

    #[error("Compiler '{compiler}' failed: {stderr}")]
    CompileFailure { compiler: String, stderr: String },

    #[error("Minifier '{minifier}' failed: {stderr}")]
    MinifyFailure { minifier: String, stderr: String },

    // Cache directory errors
    #[error("Cache directory is not writable: {path}: {reason}")]
    CacheDirUnwritable { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssetCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether this failure is the requester's fault (bad request)
    /// rather than a server-side condition
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::MissingManifest(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingManifest(_) => {
                Some("Declare the group first: the view layer writes the manifest")
            }
            Self::CacheDirUnwritable { .. } => {
                Some("Check ownership and permissions on the cache directory")
            }
            Self::CompileFailure { .. } => Some("Check that the compiler is installed and on PATH"),
            Self::MinifyFailure { .. } => Some("Check that the minifier is installed and on PATH"),
            _ => None,
        }
    }
}
