//! Stylesheet compiler adapter
//!
//! Less and Sass members are compiled to CSS by an external compiler
//! executable before minification. Beyond the compiled output the
//! core needs the transitive list of files the stylesheet imported:
//! their digests go into the rebuilt manifest so membership tracks
//! what a build actually consumed.

use crate::error::{AssetCacheError, AssetCacheResult};
use crate::request::StylesheetKind;
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Result of compiling one stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Compiled CSS text
    pub css: String,

    /// Absolute paths of every file the stylesheet imported,
    /// transitively, in discovery order
    pub imported_files: Vec<PathBuf>,
}

/// Compiles a stylesheet source against a base directory
///
/// Same input must always yield same output; no network access.
#[async_trait]
pub trait StylesheetCompiler: Send + Sync {
    /// Compile `source`, resolving imports relative to `base_dir`
    async fn compile(&self, source: &str, base_dir: &Path) -> AssetCacheResult<CompileOutput>;

    /// Executable or display name, for diagnostics
    fn name(&self) -> &str;
}

/// Compiler backed by an external executable (`lessc`, `sass`)
///
/// The source is piped to the command's stdin with the working
/// directory set to `base_dir`; stdout is the compiled CSS. Imported
/// files are enumerated by walking `@import` directives from the
/// source, since the common compiler CLIs do not report them.
pub struct CommandCompiler {
    kind: StylesheetKind,
    command: String,
    args: Vec<String>,
}

impl CommandCompiler {
    /// Create a compiler adapter for the given language and command
    pub fn new(kind: StylesheetKind, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind,
            command: command.into(),
            args,
        }
    }

    /// Build from a config command vector (`["lessc", "-"]`)
    pub fn from_command_line(kind: StylesheetKind, line: &[String]) -> AssetCacheResult<Self> {
        let (command, args) = line
            .split_first()
            .ok_or_else(|| AssetCacheError::Internal(format!("empty {kind} compiler command")))?;
        Ok(Self::new(kind, command.clone(), args.to_vec()))
    }
}

#[async_trait]
impl StylesheetCompiler for CommandCompiler {
    async fn compile(&self, source: &str, base_dir: &Path) -> AssetCacheResult<CompileOutput> {
        debug!("Compiling {} stylesheet via {}", self.kind, self.command);

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .current_dir(base_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AssetCacheError::command_failed(self.command.clone(), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A broken pipe means the compiler exited early; its exit
            // status below is the failure that matters.
            if let Err(e) = stdin.write_all(source.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(AssetCacheError::io("writing compiler stdin", e));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AssetCacheError::command_failed(self.command.clone(), e))?;

        if !output.status.success() {
            return Err(AssetCacheError::CompileFailure {
                compiler: self.command.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let imported_files = collect_imports(source, base_dir, self.kind).await?;

        Ok(CompileOutput {
            css: String::from_utf8_lossy(&output.stdout).to_string(),
            imported_files,
        })
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Walk `@import` directives transitively, returning the absolute
/// paths of every imported file that resolves under `base_dir`
///
/// Plain-CSS imports (`.css` targets) and remote URLs stay as CSS
/// `@import` rules in the compiled output and are not inlined, so
/// they are not membership either.
async fn collect_imports(
    source: &str,
    base_dir: &Path,
    kind: StylesheetKind,
) -> AssetCacheResult<Vec<PathBuf>> {
    let pattern = Regex::new(r#"@import\s+(?:\([^)]*\)\s*)?(?:url\()?["']([^"']+)["']"#)
        .map_err(|e| AssetCacheError::Internal(format!("import pattern: {e}")))?;

    let mut found = Vec::new();
    let mut pending: Vec<(String, PathBuf)> = vec![(source.to_string(), base_dir.to_path_buf())];

    while let Some((text, dir)) = pending.pop() {
        for capture in pattern.captures_iter(&text) {
            let target = &capture[1];
            if target.starts_with("http://")
                || target.starts_with("https://")
                || target.starts_with("//")
                || target.ends_with(".css")
            {
                continue;
            }

            let Some(resolved) = resolve_import(&dir, target, kind) else {
                continue;
            };
            if found.contains(&resolved) {
                continue;
            }

            let imported_source = tokio::fs::read_to_string(&resolved)
                .await
                .map_err(|e| {
                    AssetCacheError::io(format!("reading import {}", resolved.display()), e)
                })?;
            let imported_dir = resolved
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.clone());

            found.push(resolved);
            pending.push((imported_source, imported_dir));
        }
    }

    Ok(found)
}

/// Resolve one import target to an existing file, trying the bare
/// name, the language extension, and (for Sass) the partial form
fn resolve_import(dir: &Path, target: &str, kind: StylesheetKind) -> Option<PathBuf> {
    let extension = match kind {
        StylesheetKind::Less => "less",
        StylesheetKind::Sass => "scss",
    };

    let mut candidates = vec![
        dir.join(target),
        dir.join(format!("{target}.{extension}")),
    ];
    if kind == StylesheetKind::Sass {
        let path = Path::new(target);
        let stem = path.file_name()?.to_string_lossy();
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        candidates.push(dir.join(parent).join(format!("_{stem}.{extension}")));
        candidates.push(dir.join(parent).join(format!("_{stem}")));
    }

    candidates.into_iter().find(|c| c.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn collects_transitive_less_imports() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("site.less"),
            "@import \"mixins\";\nbody { color: @fg; }",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("mixins.less"),
            "@import 'colors.less';\n.rounded { border-radius: 3px; }",
        )
        .unwrap();
        std::fs::write(dir.path().join("colors.less"), "@fg: #333;").unwrap();

        let source = std::fs::read_to_string(dir.path().join("site.less")).unwrap();
        let imports = collect_imports(&source, dir.path(), StylesheetKind::Less)
            .await
            .unwrap();

        assert_eq!(
            imports,
            vec![
                dir.path().join("mixins.less"),
                dir.path().join("colors.less"),
            ]
        );
    }

    #[tokio::test]
    async fn resolves_sass_partials() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_variables.scss"), "$fg: #333;").unwrap();

        let imports = collect_imports("@import 'variables';", dir.path(), StylesheetKind::Sass)
            .await
            .unwrap();

        assert_eq!(imports, vec![dir.path().join("_variables.scss")]);
    }

    #[tokio::test]
    async fn skips_css_and_remote_imports() {
        let dir = TempDir::new().unwrap();
        let source = "@import \"legacy.css\";\n@import url(\"https://example.com/font.less\");";

        let imports = collect_imports(source, dir.path(), StylesheetKind::Less)
            .await
            .unwrap();

        assert!(imports.is_empty());
    }

    #[tokio::test]
    async fn import_cycles_terminate() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.less"), "@import 'b';").unwrap();
        std::fs::write(dir.path().join("b.less"), "@import 'a';").unwrap();

        let imports = collect_imports("@import 'a';", dir.path(), StylesheetKind::Less)
            .await
            .unwrap();

        assert_eq!(
            imports,
            vec![dir.path().join("a.less"), dir.path().join("b.less")]
        );
    }

    #[tokio::test]
    async fn command_compiler_pipes_source() {
        // `cat` stands in for a compiler: output mirrors input
        let dir = TempDir::new().unwrap();
        let compiler = CommandCompiler::new(StylesheetKind::Less, "cat", vec![]);

        let out = compiler.compile("body { color: red; }", dir.path()).await.unwrap();
        assert_eq!(out.css, "body { color: red; }");
        assert!(out.imported_files.is_empty());
    }

    #[tokio::test]
    async fn command_compiler_surfaces_failure() {
        let dir = TempDir::new().unwrap();
        let compiler = CommandCompiler::new(
            StylesheetKind::Less,
            "sh",
            vec!["-c".to_string(), "echo broken >&2; exit 1".to_string()],
        );

        let err = compiler.compile("body {}", dir.path()).await.unwrap_err();
        match err {
            AssetCacheError::CompileFailure { stderr, .. } => assert!(stderr.contains("broken")),
            other => panic!("expected CompileFailure, got {other:?}"),
        }
    }
}
