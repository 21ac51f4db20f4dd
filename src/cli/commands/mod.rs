//! Command implementations

mod build;
mod cache;
mod compile;
mod init;
mod status;

pub use build::execute as build;
pub use cache::execute as cache;
pub use compile::execute as compile;
pub use init::execute as init;
pub use status::execute as status;

use crate::adapters::Adapters;
use crate::build::BuildOrchestrator;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::AssetCacheResult;
use crate::manifest::ManifestStore;

/// Wire an orchestrator from configuration
fn orchestrator_from(config: &Config) -> AssetCacheResult<BuildOrchestrator> {
    Ok(BuildOrchestrator::new(
        config.base_dir(),
        CacheStore::new(config.cache_dir()),
        ManifestStore::new(config.cache_dir()),
        Adapters::from_config(config)?,
    ))
}
