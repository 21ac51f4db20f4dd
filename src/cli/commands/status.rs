//! Status command - environment health checks

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::AssetCacheResult;
use console::style;
use std::process::Stdio;
use tokio::process::Command;

/// Execute the status command
pub async fn execute(config: &Config) -> AssetCacheResult<()> {
    println!("{}", style("assetcache status").cyan().bold());
    println!();

    let base_dir = config.base_dir();
    check(
        "Base directory",
        &base_dir.display().to_string(),
        base_dir.is_dir(),
    );

    let store = CacheStore::new(config.cache_dir());
    let writable = store.ensure_writable().await.is_ok();
    check(
        "Cache directory",
        &config.cache_dir().display().to_string(),
        writable,
    );

    println!();
    println!("External tools:");
    for (label, line) in [
        ("Less compiler", &config.compilers.less),
        ("Sass compiler", &config.compilers.sass),
        ("CSS minifier", &config.minifiers.css),
        ("JS minifier", &config.minifiers.js),
    ] {
        let command = line.first().map(String::as_str).unwrap_or("<unset>");
        check(label, command, tool_available(command).await);
    }

    Ok(())
}

fn check(label: &str, detail: &str, ok: bool) {
    let mark = if ok {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("  {} {:<16} {}", mark, label, style(detail).dim());
}

/// Whether an executable responds to `--version`
async fn tool_available(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
