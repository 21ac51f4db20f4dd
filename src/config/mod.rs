//! Configuration management for assetcache

pub mod schema;

pub use schema::Config;

use crate::error::{AssetCacheError, AssetCacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project-local configuration file
pub const LOCAL_CONFIG_NAME: &str = "assetcache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("assetcache")
            .join("config.toml")
    }

    /// Find a project-local `assetcache.toml`, walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(LOCAL_CONFIG_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = current.parent();
        }
        None
    }

    /// Load configuration, using defaults when no file exists
    ///
    /// A project-local file, if given, wins over the manager's path.
    pub async fn load(&self, local: Option<&Path>) -> AssetCacheResult<Config> {
        if let Some(path) = local {
            debug!("Loading local config: {}", path.display());
            return Self::load_from_file(path).await;
        }

        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        Self::load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(path: &Path) -> AssetCacheResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AssetCacheError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| AssetCacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> AssetCacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AssetCacheError::io(format!("creating config directory {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            AssetCacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nonexistent.toml"));

        let config = manager.load(None).await.unwrap();
        assert_eq!(config.paths.cache_dir, "cache");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        let mut config = Config::default();
        config.paths.cache_dir = "built".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load(None).await.unwrap();

        assert_eq!(loaded.paths.cache_dir, "built");
    }

    #[tokio::test]
    async fn local_config_wins() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));
        manager.save(&Config::default()).await.unwrap();

        let local = temp.path().join(LOCAL_CONFIG_NAME);
        std::fs::write(&local, "[paths]\ncache_dir = \"local-cache\"\n").unwrap();

        let loaded = manager.load(Some(&local)).await.unwrap();
        assert_eq!(loaded.paths.cache_dir, "local-cache");
    }

    #[tokio::test]
    async fn invalid_config_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "paths = 3").unwrap();

        let err = ConfigManager::load_from_file(&path).await.unwrap_err();
        assert!(matches!(err, AssetCacheError::ConfigInvalid { .. }));
    }

    #[test]
    fn find_local_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_NAME), "").unwrap();

        let found = ConfigManager::find_local_config(&nested).unwrap();
        assert_eq!(found, temp.path().join(LOCAL_CONFIG_NAME));
    }

    #[test]
    fn find_local_config_none() {
        let temp = TempDir::new().unwrap();
        // Temp dirs sit under roots that carry no assetcache.toml
        assert!(ConfigManager::find_local_config(temp.path()).is_none());
    }
}
