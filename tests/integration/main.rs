//! Integration tests for assetcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn assetcache() -> Command {
        cargo_bin_cmd!("assetcache")
    }

    /// A project dir with pass-through external tools (`cat`), one
    /// declared css group and one declared js group
    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let base = dir.path();

            std::fs::create_dir_all(base.join("css")).unwrap();
            std::fs::create_dir_all(base.join("js")).unwrap();
            std::fs::create_dir_all(base.join("cache")).unwrap();

            std::fs::write(base.join("css/reset.css"), "body { margin: 0 }").unwrap();
            std::fs::write(base.join("css/site.less"), "@fg: #333;").unwrap();
            std::fs::write(base.join("js/app.js"), "var app = 1;").unwrap();
            std::fs::write(base.join("js/lib.min.js"), "lib!").unwrap();

            std::fs::write(
                base.join("config.toml"),
                format!(
                    r#"
[paths]
base_dir = "{}"

[compilers]
less = ["cat"]
sass = ["cat"]

[minifiers]
css = ["cat"]
js = ["cat"]
"#,
                    base.display()
                ),
            )
            .unwrap();

            Self::declare(
                base,
                "styles",
                "100",
                &["css/reset.css", "css/site.less"],
            );
            Self::declare(base, "scripts", "200", &["js/lib.min.js", "js/app.js"]);

            Self { dir }
        }

        fn declare(base: &Path, group_id: &str, buster: &str, members: &[&str]) {
            let members: Vec<_> = members
                .iter()
                .map(|path| serde_json::json!({"path": path, "digest": ""}))
                .collect();
            let manifest = serde_json::json!({
                "members": members,
                "group_digest": format!("{group_id}-digest"),
                "cache_buster": buster,
            });
            std::fs::write(
                base.join("cache").join(format!("{group_id}.json")),
                serde_json::to_string_pretty(&manifest).unwrap(),
            )
            .unwrap();
        }

        fn cmd(&self, args: &[&str]) -> Command {
            let mut cmd = assetcache();
            cmd.current_dir(self.dir.path())
                .arg("--no-local")
                .args(["--config", &self.dir.path().join("config.toml").display().to_string()])
                .args(args);
            cmd
        }

        fn cache_file(&self, name: &str) -> std::path::PathBuf {
            self.dir.path().join("cache").join(name)
        }
    }

    #[test]
    fn help_displays() {
        assetcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("On-demand asset build cache"));
    }

    #[test]
    fn version_displays() {
        assetcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("assetcache"));
    }

    #[test]
    fn build_css_group_miss_then_hit() {
        let project = Project::new();

        project
            .cmd(&["build", "cache/styles-100.min.css"])
            .assert()
            .success()
            .stdout(predicate::str::contains("miss"))
            .stdout(predicate::str::contains("Content-Type:"))
            .stdout(predicate::str::contains("text/css"));

        assert!(project.cache_file("styles-100.min.css").is_file());
        assert!(project.cache_file("styles-100.min.css.gz").is_file());

        project
            .cmd(&["build", "cache/styles-100.min.css"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hit"));
    }

    #[test]
    fn build_emits_concatenated_body() {
        let project = Project::new();

        // cat-backed tools pass members through untouched
        project
            .cmd(&["build", "cache/scripts-200.min.js", "--emit"])
            .assert()
            .success()
            .stdout(predicate::eq("lib!\n\nvar app = 1;\n\n"));
    }

    #[test]
    fn build_emits_gzip_when_accepted() {
        let project = Project::new();

        let output = project
            .cmd(&["build", "cache/scripts-200.min.js", "--emit", "--accept-gzip"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        // Gzip magic number
        assert_eq!(&output[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn build_rejects_malformed_request() {
        let project = Project::new();

        project
            .cmd(&["build", "styles.css"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid request"));
    }

    #[test]
    fn build_undeclared_group_fails() {
        let project = Project::new();

        project
            .cmd(&["build", "cache/unknown-1.min.css"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("has not been declared"));
    }

    #[test]
    fn build_missing_member_fails_without_artifacts() {
        let project = Project::new();
        std::fs::remove_file(project.dir.path().join("js/app.js")).unwrap();

        project
            .cmd(&["build", "cache/scripts-200.min.js"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Asset does not exist"))
            .stderr(predicate::str::contains("js/app.js"));

        assert!(!project.cache_file("scripts-200.min.js").exists());
        assert!(!project.cache_file("scripts-200.min.js.gz").exists());
    }

    #[test]
    fn compile_outputs_raw_css() {
        let project = Project::new();

        project
            .cmd(&["compile", "less/site.less?stopcache=1368338917"])
            .assert()
            .success()
            .stdout(predicate::eq("@fg: #333;"));

        // Debug mode never touches the cache
        assert!(!project.cache_file("site.less").exists());
    }

    #[test]
    fn compile_missing_stylesheet_fails() {
        let project = Project::new();

        project
            .cmd(&["compile", "less/gone.less"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Asset does not exist"));
    }

    #[test]
    fn status_runs() {
        let project = Project::new();

        project
            .cmd(&["status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("assetcache status"))
            .stdout(predicate::str::contains("Cache directory"));
    }

    #[test]
    fn cache_list_shows_groups() {
        let project = Project::new();

        project
            .cmd(&["build", "cache/styles-100.min.css"])
            .assert()
            .success();

        project
            .cmd(&["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("styles"))
            .stdout(predicate::str::contains("scripts"))
            .stdout(predicate::str::contains("built"));

        project
            .cmd(&["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("scripts\nstyles\n"));
    }

    #[test]
    fn cache_clear_removes_artifacts_keeps_manifests() {
        let project = Project::new();

        project
            .cmd(&["build", "cache/styles-100.min.css"])
            .assert()
            .success();
        assert!(project.cache_file("styles-100.min.css").is_file());

        project
            .cmd(&["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared"));

        assert!(!project.cache_file("styles-100.min.css").exists());
        assert!(!project.cache_file("styles-100.min.css.gz").exists());
        assert!(project.cache_file("styles.json").is_file());
    }

    #[test]
    fn init_writes_local_config() {
        let dir = TempDir::new().unwrap();

        assetcache()
            .current_dir(dir.path())
            .args(["init"])
            .assert()
            .success();

        let config = std::fs::read_to_string(dir.path().join("assetcache.toml")).unwrap();
        assert!(config.contains("[paths]"));

        // Refuses to overwrite without --force
        assetcache()
            .current_dir(dir.path())
            .args(["init"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));

        assetcache()
            .current_dir(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();
    }
}
