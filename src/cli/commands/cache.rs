//! Cache command - inspect and clear built artifacts

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::{AssetCacheError, AssetCacheResult};
use crate::manifest::ManifestStore;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> AssetCacheResult<()> {
    match args.action {
        CacheAction::List { format } => list_groups(config, format).await,
        CacheAction::Clear { yes } => clear_artifacts(config, yes).await,
    }
}

/// One group's cache state, as listed
#[derive(Debug, Serialize)]
struct GroupStatus {
    group_id: String,
    members: usize,
    cache_buster: String,
    artifacts: Vec<String>,
    total_bytes: u64,
    built_at: Option<DateTime<Utc>>,
}

/// List declared groups with their built artifacts
async fn list_groups(config: &Config, format: OutputFormat) -> AssetCacheResult<()> {
    let store = ManifestStore::new(config.cache_dir());
    let groups = store.list().await?;

    if groups.is_empty() {
        println!("No asset groups declared.");
        return Ok(());
    }

    let mut statuses = vec![];
    for group_id in groups {
        let manifest = store.load(&group_id).await?;
        let artifacts = artifact_files(config, &group_id).await?;

        let mut total_bytes = 0;
        let mut built_at = None;
        for path in &artifacts {
            if let Ok(meta) = tokio::fs::metadata(path).await {
                total_bytes += meta.len();
                if let Ok(modified) = meta.modified() {
                    built_at = Some(DateTime::<Utc>::from(modified));
                }
            }
        }

        statuses.push(GroupStatus {
            group_id,
            members: manifest.members.len(),
            cache_buster: manifest.cache_buster,
            artifacts: artifacts
                .iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
                .collect(),
            total_bytes,
            built_at,
        });
    }

    match format {
        OutputFormat::Table => print_table(&statuses),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statuses)?),
        OutputFormat::Plain => {
            for status in &statuses {
                println!("{}", status.group_id);
            }
        }
    }

    Ok(())
}

fn print_table(statuses: &[GroupStatus]) {
    println!(
        "{:<24} {:>8} {:<14} {:<10} {:>10}",
        "GROUP", "MEMBERS", "BUSTER", "STATE", "SIZE"
    );
    println!("{}", "-".repeat(72));

    for status in statuses {
        let state = if status.artifacts.is_empty() {
            style("pending").dim().to_string()
        } else {
            style("built").green().to_string()
        };

        println!(
            "{:<24} {:>8} {:<14} {:<10} {:>10}",
            status.group_id,
            status.members,
            status.cache_buster,
            state,
            format_bytes(status.total_bytes),
        );
    }

    println!();
    println!("Total: {} group(s)", statuses.len());
}

/// Format bytes as human-readable size (e.g., "1.5 KB")
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// All artifact files belonging to a group (`{id}-...`)
async fn artifact_files(config: &Config, group_id: &str) -> AssetCacheResult<Vec<PathBuf>> {
    let dir = config.cache_dir();
    let prefix = format!("{group_id}-");
    let mut files = vec![];

    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|e| AssetCacheError::io(format!("reading cache dir {}", dir.display()), e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AssetCacheError::io("reading cache dir entry", e))?
    {
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Remove every built artifact, keeping group manifests
async fn clear_artifacts(config: &Config, skip_confirm: bool) -> AssetCacheResult<()> {
    let store = ManifestStore::new(config.cache_dir());
    let mut targets = vec![];
    for group_id in store.list().await? {
        targets.extend(artifact_files(config, &group_id).await?);
    }

    if targets.is_empty() {
        println!("No built artifacts to clear.");
        return Ok(());
    }

    println!("This will remove {} artifact file(s):", targets.len());
    for path in &targets {
        println!(
            "  {} {}",
            style("•").red(),
            path.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    println!();

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut removed = 0;
    for path in targets {
        debug!("Removing artifact: {}", path.display());
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AssetCacheError::io(format!("removing {}", path.display()), e))?;
        removed += 1;
    }

    println!("{} cleared {} artifact(s)", style("✓").green(), removed);

    Ok(())
}
