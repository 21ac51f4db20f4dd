//! assetcache - On-demand Asset Build Cache
//!
//! Compiles, minifies and gzip-compresses declared groups of
//! stylesheets and scripts into single cached artifacts, keyed by a
//! content fingerprint and served from disk on repeat requests.

pub mod adapters;
pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod request;
pub mod respond;

pub use error::{AssetCacheError, AssetCacheResult};
