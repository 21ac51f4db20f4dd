//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// assetcache - On-demand asset build cache
///
/// Builds minified, gzip-compressed bundles for declared asset groups
/// and serves repeat requests for the same fingerprint straight from
/// disk.
#[derive(Parser, Debug)]
#[command(name = "assetcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ASSETCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Asset base directory (overrides configuration)
    #[arg(short, long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Skip local assetcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an asset group, or serve it from cache
    Build(BuildArgs),

    /// Compile a single stylesheet on the fly (debug mode)
    Compile(CompileArgs),

    /// Initialize a project-local assetcache.toml config
    Init(InitArgs),

    /// Check environment health and external tools
    Status,

    /// Manage built artifacts
    Cache(CacheArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Request path, e.g. "cache/{group}-{buster}.min.css"
    pub request: String,

    /// Write the selected response body to stdout
    #[arg(long)]
    pub emit: bool,

    /// Select the gzip encoding (as a gzip-accepting client would)
    #[arg(long)]
    pub accept_gzip: bool,
}

/// Arguments for the compile command
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Request path, e.g. "less/site.less" or "sass/theme.scss"
    pub request: String,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing assetcache.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List declared groups and their built artifacts
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove all built artifacts (group manifests are kept)
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
