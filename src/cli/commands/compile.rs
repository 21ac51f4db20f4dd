//! Compile command - on-the-fly stylesheet compilation (debug mode)
//!
//! Mirrors the debug path of the view helpers: individual stylesheet
//! tags that must be turned into CSS per request. Always recompiles,
//! never minifies, never writes to the cache directory.

use super::orchestrator_from;
use crate::cli::args::CompileArgs;
use crate::config::Config;
use crate::error::AssetCacheResult;
use crate::request::RawCompileRequest;

/// Execute the compile command
pub async fn execute(args: CompileArgs, config: &Config) -> AssetCacheResult<()> {
    let request = RawCompileRequest::parse(&args.request)?;
    let orchestrator = orchestrator_from(config)?;

    let path = config.css_dir().join(&request.path);
    let css = orchestrator.compile_stylesheet(&path, request.kind).await?;

    print!("{css}");
    Ok(())
}
