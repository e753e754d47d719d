//! Integration tests for modcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "name": "demo",
        "dependencies": { "alpha": "^1.0.0", "beta-v-lib": "^2.0.0" },
        "devDependencies": { "gamma": "^3.0.0" }
    }"#;

    /// Command isolated from the user's global config and NODE_ENV
    fn modcache(project: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("modcache");
        cmd.arg("--config")
            .arg(project.join("no-such-config.toml"))
            .arg("-C")
            .arg(project)
            .env_remove("NODE_ENV")
            .env_remove("MODCACHE_CONFIG");
        cmd
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
        dir
    }

    fn install_pkg(root: &Path, name: &str, version: &str) {
        let pkg = root.join("node_modules").join(name);
        fs::create_dir_all(pkg.join("lib")).unwrap();
        fs::write(
            pkg.join("package.json"),
            format!(r#"{{"name": "{}", "version": "{}"}}"#, name, version),
        )
        .unwrap();
        fs::write(pkg.join("lib/index.js"), format!("exports.v = '{}';\n", version)).unwrap();
    }

    fn cached(root: &Path, bucket: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(root.join(".modules").join(bucket))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("modcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("offline module cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("modcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("modcache"));
    }

    #[test]
    fn missing_manifest_fails() {
        let dir = TempDir::new().unwrap();
        modcache(dir.path())
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }

    #[test]
    fn pack_then_install_roundtrip() {
        let dir = project();
        install_pkg(dir.path(), "alpha", "1.0.0");
        install_pkg(dir.path(), "beta-v-lib", "2.1.0");
        install_pkg(dir.path(), "gamma", "3.0.0");

        modcache(dir.path()).arg("pack").assert().success();

        assert_eq!(
            cached(dir.path(), "dependencies"),
            vec!["alpha-v1.0.0.tgz", "beta-v-lib-v2.1.0.tgz"]
        );
        assert_eq!(cached(dir.path(), "devDependencies"), vec!["gamma-v3.0.0.tgz"]);

        fs::remove_dir_all(dir.path().join("node_modules")).unwrap();

        modcache(dir.path())
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("npm rebuild"));

        let index = fs::read_to_string(dir.path().join("node_modules/beta-v-lib/lib/index.js")).unwrap();
        assert_eq!(index, "exports.v = '2.1.0';\n");
        assert!(dir.path().join("node_modules/gamma/package.json").is_file());
    }

    #[test]
    fn pack_prunes_and_updates() {
        let dir = project();
        install_pkg(dir.path(), "alpha", "1.0.0");
        modcache(dir.path()).arg("pack").assert().success();

        install_pkg(dir.path(), "alpha", "1.2.0");
        fs::write(
            dir.path().join(".modules/dependencies/dropped-v0.1.0.tgz"),
            b"old",
        )
        .unwrap();

        modcache(dir.path())
            .args(["pack", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("remove dropped@0.1.0"))
            .stdout(predicate::str::contains("update alpha 1.0.0 -> 1.2.0"))
            .stdout(predicate::str::contains("gamma is not installed"));

        // Dry run leaves the cache alone
        assert_eq!(
            cached(dir.path(), "dependencies"),
            vec!["alpha-v1.0.0.tgz", "dropped-v0.1.0.tgz"]
        );

        modcache(dir.path()).arg("pack").assert().success();
        assert_eq!(cached(dir.path(), "dependencies"), vec!["alpha-v1.2.0.tgz"]);
    }

    #[test]
    fn pack_dry_run_on_fresh_project_creates_nothing() {
        let dir = project();
        install_pkg(dir.path(), "alpha", "1.0.0");

        modcache(dir.path())
            .args(["pack", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("add alpha@1.0.0"));

        assert!(!dir.path().join(".modules").exists());
    }

    #[test]
    fn pack_warns_about_malformed_archive() {
        let dir = project();
        install_pkg(dir.path(), "alpha", "1.0.0");
        fs::create_dir_all(dir.path().join(".modules/dependencies")).unwrap();
        fs::write(dir.path().join(".modules/dependencies/junk.tgz"), b"").unwrap();

        modcache(dir.path())
            .arg("pack")
            .assert()
            .success()
            .stdout(predicate::str::contains("ignoring junk.tgz"));

        assert_eq!(
            cached(dir.path(), "dependencies"),
            vec!["alpha-v1.0.0.tgz", "junk.tgz"]
        );
    }

    #[test]
    fn pack_single_module() {
        let dir = project();
        install_pkg(dir.path(), "gamma", "3.0.1");

        modcache(dir.path())
            .args(["pack", "gamma"])
            .assert()
            .success()
            .stdout(predicate::str::contains("gamma@3.0.1"));

        assert_eq!(cached(dir.path(), "devDependencies"), vec!["gamma-v3.0.1.tgz"]);
        assert!(cached(dir.path(), "dependencies").is_empty());
    }

    #[test]
    fn pack_unknown_module_exits_1() {
        let dir = project();
        modcache(dir.path())
            .args(["pack", "x"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("x is not declared"));

        assert!(cached(dir.path(), "dependencies").is_empty());
        assert!(cached(dir.path(), "devDependencies").is_empty());
    }

    #[test]
    fn pack_uninstalled_module_exits_1() {
        let dir = project();
        modcache(dir.path())
            .args(["pack", "alpha"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("not installed"));
    }

    #[test]
    fn node_env_production_skips_dev_bucket() {
        let dir = project();
        install_pkg(dir.path(), "alpha", "1.0.0");
        install_pkg(dir.path(), "gamma", "3.0.0");

        modcache(dir.path())
            .env("NODE_ENV", "production")
            .arg("pack")
            .assert()
            .success();

        assert_eq!(cached(dir.path(), "dependencies"), vec!["alpha-v1.0.0.tgz"]);
        assert!(cached(dir.path(), "devDependencies").is_empty());
    }

    #[test]
    fn install_empty_cache_succeeds() {
        let dir = project();
        modcache(dir.path())
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache is empty"));

        assert_eq!(
            fs::read_dir(dir.path().join("node_modules")).unwrap().count(),
            0
        );
    }

    #[test]
    fn list_plain() {
        let dir = project();
        install_pkg(dir.path(), "alpha", "1.0.0");
        modcache(dir.path()).arg("pack").assert().success();

        modcache(dir.path())
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dependencies/alpha@1.0.0"));
    }

    #[test]
    fn list_empty_json() {
        let dir = TempDir::new().unwrap();
        modcache(dir.path())
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::diff("[]\n"));
    }
}
