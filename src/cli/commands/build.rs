//! Build command - build or serve a cached asset group

use super::orchestrator_from;
use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::{AssetCacheError, AssetCacheResult};
use crate::request::AssetGroupRequest;
use crate::respond::ArtifactResponse;
use console::style;
use std::io::Write;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> AssetCacheResult<()> {
    let request = AssetGroupRequest::parse(&args.request)?;
    let orchestrator = orchestrator_from(config)?;

    let outcome = orchestrator.handle(&request).await?;
    let cache_hit = outcome.cache_hit;
    let response = ArtifactResponse::select(outcome.artifact, args.accept_gzip);

    if args.emit {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(response.body())
            .and_then(|()| handle.flush())
            .map_err(|e| AssetCacheError::io("writing response body to stdout", e))?;
        return Ok(());
    }

    let verdict = if cache_hit {
        style("hit").green().to_string()
    } else {
        style("miss (built)").yellow().to_string()
    };

    println!("{:<18} {}", "Artifact:", request.artifact_name());
    println!("{:<18} {}", "Cache:", verdict);
    for (name, value) in response.headers() {
        println!("{:<18} {}", format!("{name}:"), value);
    }

    Ok(())
}
