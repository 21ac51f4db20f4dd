//! Request parsing
//!
//! The front-end web server rewrites asset URLs onto this tool. Two
//! request shapes reach the core:
//!
//! - `cache/{group_id}-{cache_buster}.min.{ext}`: build (or serve)
//!   a cached asset group
//! - `less/{file}` / `sass/{file}`: compile a single stylesheet on
//!   the fly, uncached and unminified (debug mode)

use crate::error::{AssetCacheError, AssetCacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset type of a group, decides minifier and content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Css,
    Js,
}

impl AssetType {
    /// MIME type reported alongside the artifact bytes
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Css => "text/css",
            Self::Js => "text/javascript",
        }
    }

    /// File extension used in artifact names
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            _ => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A parsed request for a cached asset group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetGroupRequest {
    /// Stable identifier for the member set (opaque to the core)
    pub group_id: String,

    /// Cache-busting token; changes when declared membership changes
    pub cache_buster: String,

    /// Asset type of the group
    pub asset_type: AssetType,
}

impl AssetGroupRequest {
    /// Parse a request path of the shape
    /// `cache/{group_id}-{cache_buster}.min.{ext}`
    ///
    /// The group id and buster split on the LAST dash so ids that
    /// contain dashes survive. Anything else is an invalid request.
    pub fn parse(path: &str) -> AssetCacheResult<Self> {
        let bad = || AssetCacheError::InvalidRequest(format!("asset name: {path}"));

        let rest = path
            .split("cache/")
            .nth(1)
            .ok_or_else(bad)?
            .split(['?', '&'])
            .next()
            .unwrap_or_default();

        let (stem, ext) = rest
            .rsplit_once(".min.")
            .filter(|(stem, _)| !stem.is_empty())
            .ok_or_else(bad)?;

        let asset_type = AssetType::from_extension(ext).ok_or_else(bad)?;

        let (group_id, cache_buster) = stem.rsplit_once('-').ok_or_else(bad)?;
        if group_id.is_empty() || cache_buster.is_empty() {
            return Err(bad());
        }

        Ok(Self {
            group_id: group_id.to_string(),
            cache_buster: cache_buster.to_string(),
            asset_type,
        })
    }

    /// File name of the built artifact for this request
    pub fn artifact_name(&self) -> String {
        format!(
            "{}-{}.min.{}",
            self.group_id,
            self.cache_buster,
            self.asset_type.extension()
        )
    }
}

/// Stylesheet language of a raw compile request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylesheetKind {
    Less,
    Sass,
}

impl fmt::Display for StylesheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Less => write!(f, "less"),
            Self::Sass => write!(f, "sass"),
        }
    }
}

/// A parsed on-the-fly compile request (debug mode)
///
/// Always recompiles, never minifies, never touches the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompileRequest {
    /// Stylesheet path relative to the css directory
    pub path: String,

    /// Which compiler to run
    pub kind: StylesheetKind,
}

impl RawCompileRequest {
    /// Parse a request path of the shape `less/{file}` or
    /// `sass/{file}`, tolerating a trailing query string
    pub fn parse(path: &str) -> AssetCacheResult<Self> {
        let kind = if path.contains("less/") {
            StylesheetKind::Less
        } else if path.contains("sass/") {
            StylesheetKind::Sass
        } else {
            return Err(AssetCacheError::InvalidRequest(format!(
                "not a stylesheet compile request: {path}"
            )));
        };

        let marker = format!("{kind}/");
        let file = path
            .split(&marker)
            .nth(1)
            .unwrap_or_default()
            .split(['?', '&'])
            .next()
            .unwrap_or_default();

        if file.is_empty() {
            return Err(AssetCacheError::InvalidRequest(format!(
                "missing stylesheet name: {path}"
            )));
        }

        Ok(Self {
            path: file.to_string(),
            kind,
        })
    }
}
