//! Integration tests for branchrule
//!
//! These tests drive the CLI against temporary rules files.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a branchrule Command
fn branchrule() -> Command {
    let mut cmd = cargo_bin_cmd!("branchrule");
    cmd.env_remove("BRANCHRULE_CACHE_TTL").env_remove("RUST_LOG");
    cmd
}

/// Helper to create a project directory with the given rules.toml
fn project_with_rules(rules: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join(".branchrule");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rules.toml"), rules).unwrap();
    dir
}

const RELEASE_APPROVAL_RULES: &str = r#"
[[rules]]
scope = "project"
scope_id = 1
pattern = "release/*"
workspace = "STAGING"
artifact_workspace = "STAGING,PROD"
need_approval = true

[[rules]]
scope = "application"
scope_id = 10
pattern = "feature/*"
workspace = "DEV,TEST"
artifact_workspace = "DEV"
is_trigger_pipeline = true

[[applications]]
id = 10
project_id = 1
extra = '{"STAGING.configNamespace": "app-10-staging"}'
"#;

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        branchrule().arg("--help").assert().success();
    }

    #[test]
    fn test_version() {
        branchrule().arg("--version").assert().success();
    }
}

// =============================================================================
// Reference Classification
// =============================================================================

mod reference {
    use super::*;

    #[test]
    fn test_classify_feature() {
        branchrule()
            .args(["classify", "feature/login"])
            .assert()
            .success()
            .stdout(predicate::str::contains("feature/login: feature"))
            .stdout(predicate::str::contains("default workspace: DEV"));
    }

    #[test]
    fn test_classify_full_ref() {
        branchrule()
            .args(["classify", "refs/tags/v3.5.0-fix-123-bug-456"])
            .assert()
            .success()
            .stdout(predicate::str::contains("release-tag"));
    }

    #[test]
    fn test_classify_json() {
        let output = branchrule()
            .args(["--json", "classify", "release/1.0"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["kind"], "release");
        assert_eq!(value["prefix"], "release");
        assert_eq!(value["default_workspace"], "STAGING");
    }

    #[test]
    fn test_prefix_valid() {
        branchrule()
            .args(["prefix", "master"])
            .assert()
            .success()
            .stdout("master\n");
    }

    #[test]
    fn test_prefix_unsupported() {
        branchrule()
            .args(["prefix", "randombranch"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported reference 'randombranch'"))
            .stderr(predicate::str::contains("hotfix/*"));
    }

    #[test]
    fn test_prefixes_table() {
        branchrule()
            .arg("prefixes")
            .assert()
            .success()
            .stdout(predicate::str::contains("master"))
            .stdout(predicate::str::contains("release/*    STAGING"))
            .stdout(predicate::str::contains("feature/*    DEV"));
    }

    #[test]
    fn test_match_any_pattern() {
        branchrule()
            .args(["match", "feature/x", "develop", "feature/*"])
            .assert()
            .success();
    }

    #[test]
    fn test_match_none() {
        branchrule()
            .args(["match", "feature/", "feature/*"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("matches none of"));
    }
}

// =============================================================================
// Rule Resolution
// =============================================================================

mod resolution {
    use super::*;

    #[test]
    fn test_resolve_matching_rule() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["resolve", "release/2.0", "--project", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("workspace:           STAGING"))
            .stdout(predicate::str::contains("need_approval:       true"));
    }

    #[test]
    fn test_resolve_falls_back_to_git_flow() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        let output = branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["--json", "resolve", "feature/foo", "--project", "1"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["workspace"], "DEV");
        assert_eq!(value["need_approval"], false);
    }

    #[test]
    fn test_resolve_unknown_reference() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["resolve", "randombranch", "--project", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No branch rule for 'randombranch'"));
    }

    #[test]
    fn test_resolve_application_inherits_project_rules() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["resolve", "refs/heads/release/3.0", "--app", "10"])
            .assert()
            .success()
            .stdout(predicate::str::contains("STAGING"));

        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["resolve", "feature/a", "--app", "10"])
            .assert()
            .success()
            .stdout(predicate::str::contains("workspace:           DEV,TEST"))
            .stdout(predicate::str::contains("is_trigger_pipeline: true"));
    }

    #[test]
    fn test_resolve_requires_target() {
        branchrule()
            .args(["resolve", "master"])
            .assert()
            .failure();
    }

    #[test]
    fn test_resolve_unknown_application() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["resolve", "master", "--app", "99"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Application 99 not found"));
    }

    #[test]
    fn test_resolve_without_rules_file() {
        let dir = TempDir::new().unwrap();
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["resolve", "develop", "--project", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("workspace:           TEST"));
    }

    #[test]
    fn test_check_workspace() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        let output = branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["--json", "check-workspace", "TEST", "--app", "10"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["valid_workspace"], true);
        assert_eq!(value["valid_artifact_workspace"], false);
    }

    #[test]
    fn test_check_workspace_rejects_unknown() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["check-workspace", "UAT", "--project", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid workspace 'UAT'"));
    }

    #[test]
    fn test_workspaces_lists_expanded_pairs() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        let output = branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["--json", "workspaces", "--app", "10"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let pairs: Vec<(String, String)> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|m| {
                (
                    m["pattern"].as_str().unwrap().to_string(),
                    m["workspace"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("feature/*".to_string(), "DEV".to_string()),
                ("feature/*".to_string(), "TEST".to_string()),
                ("release/*".to_string(), "STAGING".to_string()),
            ]
        );
    }

    #[test]
    fn test_namespace() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["namespace", "--app", "10", "STAGING"])
            .assert()
            .success()
            .stdout("app-10-staging\n");

        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["namespace", "--app", "10", "DEV"])
            .assert()
            .success()
            .stdout(predicate::str::contains("DEFAULT (no namespace configured)"));
    }

    #[test]
    fn test_invalid_rule_fails_resolution() {
        let dir = project_with_rules(
            r#"
            [[rules]]
            scope = "project"
            scope_id = 1
            pattern = "master"
            workspace = "LIVE"
            "#,
        );
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["resolve", "master", "--project", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown workspace 'LIVE'"));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_init_creates_rules_file() {
        let dir = TempDir::new().unwrap();
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created rules.toml"));

        assert!(dir.path().join(".branchrule/rules.toml").exists());

        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Rules are valid."));
    }

    #[test]
    fn test_config_init_does_not_overwrite() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        let content = fs::read_to_string(dir.path().join(".branchrule/rules.toml")).unwrap();
        assert_eq!(content, RELEASE_APPROVAL_RULES);
    }

    #[test]
    fn test_config_show_without_file() {
        let dir = TempDir::new().unwrap();
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("Using the git-flow defaults"));
    }

    #[test]
    fn test_config_show_respects_env_ttl() {
        let dir = project_with_rules(RELEASE_APPROVAL_RULES);
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "show"])
            .env("BRANCHRULE_CACHE_TTL", "7")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache_ttl = 7s"))
            .stdout(predicate::str::contains("[project 1] release/*"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = project_with_rules(
            r#"
            [[rules]]
            scope = "application"
            scope_id = 5
            pattern = "develop"
            "#,
        );
        branchrule()
            .arg("--project-dir")
            .arg(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Rule warnings:"))
            .stdout(predicate::str::contains("has no workspace"))
            .stdout(predicate::str::contains("undeclared application 5"));
    }
}
