//! Configuration schema for assetcache
//!
//! Configuration is stored at `~/.config/assetcache/config.toml`, or
//! per-project as `assetcache.toml` next to the assets.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Directory layout
    pub paths: PathsConfig,

    /// Stylesheet compiler command lines
    pub compilers: CompilersConfig,

    /// Minifier command lines per asset type
    pub minifiers: MinifiersConfig,
}

impl Config {
    /// The asset base directory member paths resolve under
    pub fn base_dir(&self) -> PathBuf {
        self.paths.base_dir.clone()
    }

    /// The cache directory (relative entries resolve under base_dir)
    pub fn cache_dir(&self) -> PathBuf {
        self.paths.base_dir.join(&self.paths.cache_dir)
    }

    /// The stylesheet directory raw compile requests resolve under
    pub fn css_dir(&self) -> PathBuf {
        self.paths.base_dir.join(&self.paths.css_dir)
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Directory layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Asset base directory; group member paths are relative to it
    pub base_dir: PathBuf,

    /// Cache directory, relative to base_dir
    pub cache_dir: String,

    /// Stylesheet directory for on-the-fly compiles, relative to base_dir
    pub css_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            cache_dir: "cache".to_string(),
            css_dir: "css".to_string(),
        }
    }
}

/// Stylesheet compiler command lines (executable + args)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilersConfig {
    /// Less compiler; receives source on stdin, emits CSS on stdout
    pub less: Vec<String>,

    /// Sass compiler; same stdin/stdout contract
    pub sass: Vec<String>,
}

impl Default for CompilersConfig {
    fn default() -> Self {
        Self {
            less: vec!["lessc".to_string(), "-".to_string()],
            sass: vec![
                "sass".to_string(),
                "--stdin".to_string(),
                "--no-source-map".to_string(),
            ],
        }
    }
}

/// Minifier command lines (executable + args)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifiersConfig {
    /// CSS minifier; stdin to stdout
    pub css: Vec<String>,

    /// JS minifier; stdin to stdout
    pub js: Vec<String>,
}

impl Default for MinifiersConfig {
    fn default() -> Self {
        Self {
            css: vec!["csso".to_string()],
            js: vec![
                "terser".to_string(),
                "--compress".to_string(),
                "--mangle".to_string(),
            ],
        }
    }
}
