//! assetcache - On-demand Asset Build Cache
//!
//! CLI entry point that dispatches to subcommands.

use assetcache::cli::{Cli, Commands};
use assetcache::config::ConfigManager;
use assetcache::error::AssetCacheResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AssetCacheResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("assetcache=warn"),
        1 => EnvFilter::new("assetcache=info"),
        _ => EnvFilter::new("assetcache=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Init command doesn't need config loading
    if let Commands::Init(args) = cli.command {
        return assetcache::cli::commands::init(args).await;
    }

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| assetcache::error::AssetCacheError::io("getting current directory", e))?;
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let mut config = config_manager.load(local_config_path.as_deref()).await?;

    // CLI base dir wins over whatever the config says
    if let Some(base_dir) = cli.base_dir {
        config.paths.base_dir = base_dir;
    }

    // Dispatch to command
    match cli.command {
        Commands::Init(_) => unreachable!("Init handled above"),
        Commands::Build(args) => assetcache::cli::commands::build(args, &config).await,
        Commands::Compile(args) => assetcache::cli::commands::compile(args, &config).await,
        Commands::Status => assetcache::cli::commands::status(&config).await,
        Commands::Cache(args) => assetcache::cli::commands::cache(args, &config).await,
    }
}
