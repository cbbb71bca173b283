//! Integration tests for Dandelion

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    const BUNDLES: &str = r#"
[[scope]]
name = "app"
parent = "jquery"

[[asset]]
name = "jquery"
bundle = "jquery"
version = "3.7.1"
vendor = true
[asset.locations]
webapp = "/vendor/jquery.js"

[[asset]]
name = "app"
bundle = "app"
[asset.locations]
webapp = "/js/app.js"

[[asset]]
name = "app"
bundle = "app"
[asset.locations]
webapp = "/css/app.css"
"#;

    /// Temp webapp with bundle definitions and an isolated config path
    struct Site {
        dir: TempDir,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path().join("webapp");
            fs::create_dir_all(root.join("js")).unwrap();
            fs::create_dir_all(root.join("css")).unwrap();
            fs::create_dir_all(root.join("vendor")).unwrap();
            fs::write(root.join("js/app.js"), "// app\nvar app = 1;\n").unwrap();
            fs::write(root.join("css/app.css"), "body {\n  color : red;\n}\n").unwrap();
            fs::write(root.join("vendor/jquery.js"), "jQuery();").unwrap();
            fs::write(dir.path().join("bundles.toml"), BUNDLES).unwrap();
            Self { dir }
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("dandelion");
            cmd.env("DANDELION_CONFIG", self.dir.path().join("config.toml"))
                .env_remove("DANDELION_PROFILE");
            cmd
        }

        fn resolve(&self) -> Command {
            let mut cmd = self.cmd();
            cmd.arg("resolve")
                .arg("--bundles")
                .arg(self.dir.path().join("bundles.toml"))
                .arg("--webapp-root")
                .arg(self.dir.path().join("webapp"))
                .args(["--scope", "app"]);
            cmd
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("dandelion")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("web asset pipeline"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("dandelion")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("dandelion"));
    }

    #[test]
    fn config_path() {
        let site = Site::new();
        site.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let site = Site::new();
        site.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[asset]"))
            .stdout(predicate::str::contains("/dandelion-assets/"));
    }

    #[test]
    fn config_set_then_show() {
        let site = Site::new();
        site.cmd()
            .args(["config", "set", "asset.merging", "dynamic"])
            .assert()
            .success();
        site.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("merging = \"dynamic\""));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let site = Site::new();
        site.cmd()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown config key"));
    }

    #[test]
    fn resolve_plain_dev() {
        let site = Site::new();
        site.resolve()
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/vendor/jquery.js"))
            .stdout(predicate::str::contains("/app-"))
            .stdout(predicate::str::contains(".css"));
    }

    #[test]
    fn resolve_json_prod_merges() {
        let site = Site::new();
        let output = site
            .resolve()
            .args(["--profile", "prod", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let names: Vec<&str> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["jquery", "merged"]);
        assert_eq!(rows[1]["type"], "js");
        assert_eq!(rows[0]["version"], "3.7.1");
        assert_eq!(rows[1]["merged"], true);
    }

    #[test]
    fn resolve_content_minified_in_prod() {
        let site = Site::new();
        site.resolve()
            .args(["--profile", "prod", "--format", "plain", "--content"])
            .assert()
            .success()
            .stdout(predicate::str::contains("var app=1;"))
            .stdout(predicate::str::contains("body{color :red}"));
    }

    #[test]
    fn resolve_type_filter() {
        let site = Site::new();
        site.resolve()
            .args(["--type", "css", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(".css"))
            .stdout(predicate::str::contains(".js").not());
    }

    #[test]
    fn resolve_unknown_scope_fails() {
        let site = Site::new();
        let mut cmd = site.cmd();
        cmd.arg("resolve")
            .arg("--bundles")
            .arg(site.dir.path().join("bundles.toml"))
            .args(["--scope", "missing"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Scope not found"));
    }

    #[test]
    fn resolve_missing_file_reports_fetch_error() {
        let site = Site::new();
        fs::remove_file(site.dir.path().join("webapp/js/app.js")).unwrap();
        site.resolve()
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to fetch the asset"));
    }
}
