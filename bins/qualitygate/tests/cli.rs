//! End-to-end tests for the qualitygate binary

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn qualitygate() -> Command {
    let mut cmd = cargo_bin_cmd!("qualitygate");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const MANIFEST: &str = r#"[package]
name = "demo"
version = "0.1.0"
edition = "2021"
license = "MIT"
description = "demo crate"
repository = "https://example.org/demo"
readme = "README.md"
rust-version = "1.70"
documentation = "https://docs.rs/demo"
exclude = ["/.github"]

[package.metadata.docs.rs]
all-features = true
"#;

const README: &str = "# demo\n\n\
    ![ci](https://img.shields.io/ci) ![crates](https://img.shields.io/crates) \
    ![docs](https://docs.rs/badge/demo)\n\n\
    ## Installation\n\ncargo add demo\n\n## Quickstart\n\n```rust\nfn main() {}\n```\n";

/// A project that satisfies every standard rule except CHANGELOG.md
fn populated_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Cargo.toml", MANIFEST);
    write(root, "README.md", README);
    for file in [
        "LICENSE",
        ".gitignore",
        "CITATION.cff",
        "SECURITY.md",
        "CODE_OF_CONDUCT.md",
        "deny.toml",
        "RELEASE_NOTES.md",
        ".github/workflows/ci.yml",
        ".github/workflows/audit.yml",
        ".github/workflows/deny.yml",
        ".github/workflows/sbom.yml",
        ".github/ISSUE_TEMPLATE/bug_report.md",
        ".github/ISSUE_TEMPLATE/feature_request.md",
        ".github/ISSUE_TEMPLATE/config.yml",
        ".github/pull_request_template.md",
    ] {
        write(root, file, "placeholder\n");
    }
    write(root, "src/lib.rs", "#![forbid(unsafe_code)]\npub fn one() -> u8 { 1 }\n");
    write(root, "tests/a.rs", "#[test] fn a() {}\n");
    write(root, "tests/b.rs", "#[test] fn b() {}\n");
    write(root, "examples/basic.rs", "fn main() {}\n");
    write(root, "benches/one.rs", "fn main() {}\n");
    dir
}

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        qualitygate().arg("--help").assert().success();
    }

    #[test]
    fn test_version() {
        qualitygate()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_json_log_format() {
        let dir = TempDir::new().unwrap();
        qualitygate()
            .args(["--verbose", "--log-format", "json", "list"])
            .arg(dir.path())
            .assert()
            .success()
            .stderr(predicate::str::contains("\"level\":\"DEBUG\""))
            .stderr(predicate::str::contains("starting qualitygate"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        qualitygate()
            .args(["run", "--timeout", "0"])
            .arg(dir.path())
            .assert()
            .failure();
    }
}

mod run {
    use super::*;

    #[test]
    fn test_empty_directory_fails() {
        let dir = TempDir::new().unwrap();
        qualitygate()
            .args(["run", "--no-commands"])
            .arg(dir.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Errors ("))
            .stdout(predicate::str::contains("FAIL"));
    }

    #[test]
    fn test_populated_project_passes_with_warning() {
        let dir = populated_project();
        qualitygate()
            .args(["run", "--no-commands"])
            .arg(dir.path())
            .assert()
            .code(0)
            .stdout(predicate::str::contains("Warnings (1):"))
            .stdout(predicate::str::contains("CHANGELOG.md"))
            .stdout(predicate::str::contains("PASS WITH WARNINGS"));
    }

    #[test]
    fn test_skip_removes_rule() {
        let dir = populated_project();
        qualitygate()
            .args(["run", "--no-commands", "--skip", "changelog"])
            .arg(dir.path())
            .assert()
            .code(0)
            .stdout(predicate::str::contains("Warnings (").not());
    }

    #[test]
    fn test_json_output() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Cargo.toml", "[package]\nname = \"x\"\n");

        let output = qualitygate()
            .args(["run", "--no-commands", "--format", "json"])
            .arg(dir.path())
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["verdict"], "fail");
        let errors = json["errors"].as_array().unwrap();
        assert!(errors.iter().any(|e| e["rule_id"] == "manifest-version"));
        assert!(errors.iter().all(|e| e["rule_id"] != "manifest-name"));
    }

    #[test]
    fn test_hardcoded_secret_is_error() {
        let dir = populated_project();
        write(dir.path(), "CHANGELOG.md", "# Changelog\n");
        write(dir.path(), "src/db.rs", "pub const PASSWORD: &str = \"\";\nlet password = \"hunter2\";\n");

        qualitygate()
            .args(["run", "--no-commands"])
            .arg(dir.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("no hardcoded secrets"));
    }

    #[test]
    fn test_missing_required_tool_fails() {
        let dir = populated_project();
        write(dir.path(), "CHANGELOG.md", "# Changelog\n");
        write(
            dir.path(),
            "qualitygate.toml",
            "[commands]\nprogram = \"nonexistent_build_tool_12345\"\n",
        );

        qualitygate()
            .arg("run")
            .arg(dir.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("tool not installed"));
    }
}

mod config_errors {
    use super::*;

    #[test]
    fn test_missing_directory_exits_3() {
        let dir = TempDir::new().unwrap();
        qualitygate()
            .arg("run")
            .arg(dir.path().join("nope"))
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Project directory not found"));
    }

    #[test]
    fn test_invalid_config_exits_3() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".qualitygate.toml", "[commands]\ntimeout_secs = 0\n");
        qualitygate()
            .arg("run")
            .arg(dir.path())
            .assert()
            .code(3)
            .stderr(predicate::str::contains("timeout_secs"));
    }

    #[test]
    fn test_unknown_key_exits_3() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".qualitygate.toml", "[nonsense]\nkey = 1\n");
        qualitygate().arg("run").arg(dir.path()).assert().code(3);
    }

    #[test]
    fn test_bad_custom_regex_exits_3() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "qualitygate.toml",
            r#"
[[rules.custom]]
id = "broken"
description = "broken"
check = { kind = "content_matches_pattern", path = "README.md", pattern = "([" }
"#,
        );
        qualitygate().arg("run").arg(dir.path()).assert().code(3);
    }

    #[test]
    fn test_custom_id_reusing_builtin_exits_3() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "qualitygate.toml",
            r#"
[[rules.custom]]
id = "license"
description = "LICENSE mentions MIT"
check = { kind = "content_contains", path = "LICENSE", needle = "MIT" }
"#,
        );
        qualitygate()
            .arg("list")
            .arg(dir.path())
            .assert()
            .code(3)
            .stderr(predicate::str::contains("'license'"));
    }

    #[test]
    fn test_missing_explicit_config_exits_3() {
        let dir = TempDir::new().unwrap();
        qualitygate()
            .arg("run")
            .arg(dir.path())
            .arg("--config")
            .arg(dir.path().join("missing.toml"))
            .assert()
            .code(3);
    }
}

mod list {
    use super::*;

    #[test]
    fn test_list_text() {
        let dir = TempDir::new().unwrap();
        qualitygate()
            .arg("list")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("hardcoded-secrets"))
            .stdout(predicate::str::contains("Code validation"));
    }

    #[test]
    fn test_list_json_includes_custom_rule() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".qualitygate.toml",
            r#"
[commands]
enabled = false

[[rules.custom]]
id = "msrv-note"
phase = "documentation"
description = "README mentions MSRV"
check = { kind = "content_contains", path = "README.md", needle = "MSRV" }
"#,
        );

        let output = qualitygate()
            .args(["list", "--format", "json"])
            .arg(dir.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let rules = json.as_array().unwrap();
        assert!(rules.iter().all(|r| r["phase"] != "validation"));
        let custom = rules.last().unwrap();
        assert_eq!(custom["id"], "msrv-note");
        assert_eq!(custom["required"], false);
    }
}
