//! Minifier adapter
//!
//! One minifier per asset type. The contract is idempotence:
//! `minify(minify(x)) == minify(x)`. Pre-minified members are copied
//! through untouched, so nothing in the core depends on minification
//! being reversible or even meaningful.

use crate::error::{AssetCacheError, AssetCacheResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Minifies asset text of one type
#[async_trait]
pub trait Minifier: Send + Sync {
    /// Minify the given text
    async fn minify(&self, text: &str) -> AssetCacheResult<String>;

    /// Executable or display name, for diagnostics
    fn name(&self) -> &str;
}

/// Minifier backed by an external executable (`csso`, `terser`, ...)
///
/// Text goes in on stdin, minified text comes back on stdout.
pub struct CommandMinifier {
    command: String,
    args: Vec<String>,
}

impl CommandMinifier {
    /// Create a minifier adapter from a command line
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Build from a config command vector (`["terser", "--compress"]`)
    ///
    /// An empty vector is an internal error: config defaults always
    /// supply at least the executable name.
    pub fn from_command_line(line: &[String]) -> AssetCacheResult<Self> {
        let (command, args) = line
            .split_first()
            .ok_or_else(|| AssetCacheError::Internal("empty minifier command".to_string()))?;
        Ok(Self::new(command.clone(), args.to_vec()))
    }
}

#[async_trait]
impl Minifier for CommandMinifier {
    async fn minify(&self, text: &str) -> AssetCacheResult<String> {
        debug!("Minifying via {}", self.command);

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AssetCacheError::command_failed(self.command.clone(), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A broken pipe means the minifier exited early; its exit
            // status below is the failure that matters.
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(AssetCacheError::io("writing minifier stdin", e));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AssetCacheError::command_failed(self.command.clone(), e))?;

        if !output.status.success() {
            return Err(AssetCacheError::MinifyFailure {
                minifier: self.command.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn name(&self) -> &str {
        &self.command
    }
}
