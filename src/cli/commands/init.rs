//! Init command - write a project-local assetcache.toml

use crate::cli::args::InitArgs;
use crate::config::{Config, LOCAL_CONFIG_NAME};
use crate::error::{AssetCacheError, AssetCacheResult};
use console::style;

/// Execute the init command
pub async fn execute(args: InitArgs) -> AssetCacheResult<()> {
    let dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| AssetCacheError::io("getting current directory", e))?,
    };
    let target = dir.join(LOCAL_CONFIG_NAME);

    if target.exists() && !args.force {
        return Err(AssetCacheError::Internal(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    let content = toml::to_string_pretty(&Config::default())?;
    tokio::fs::write(&target, content)
        .await
        .map_err(|e| AssetCacheError::io(format!("writing {}", target.display()), e))?;

    println!("{} wrote {}", style("✓").green(), target.display());
    Ok(())
}
