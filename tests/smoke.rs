//! Smoke tests -- verify the binary runs and key subcommands parse.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("ethtriage")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Fleet log triage and health scoring",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("ethtriage")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("ethtriage"));
}

#[test]
fn test_analyze_subcommand_exists() {
    Command::cargo_bin("ethtriage")
        .unwrap()
        .args(["analyze", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--hours"));
}

#[test]
fn test_health_subcommand_exists() {
    Command::cargo_bin("ethtriage")
        .unwrap()
        .args(["health", "--help"])
        .assert()
        .success();
}

#[test]
fn test_patterns_subcommand_exists() {
    Command::cargo_bin("ethtriage")
        .unwrap()
        .args(["patterns", "--help"])
        .assert()
        .success();
}

#[test]
fn test_recommend_subcommand_exists() {
    Command::cargo_bin("ethtriage")
        .unwrap()
        .args(["recommend", "--help"])
        .assert()
        .success();
}

#[test]
fn test_missing_config_is_a_clean_error() {
    Command::cargo_bin("ethtriage")
        .unwrap()
        .args(["--config", "/nonexistent/config.yaml", "nodes"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("not found"));
}

#[test]
fn test_nodes_lists_fleet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "nodes:\n  - name: vega\n    tailscale_domain: vega.tail1234.ts.net\n",
    )
    .unwrap();

    Command::cargo_bin("ethtriage")
        .unwrap()
        .args(["--config", path.to_str().unwrap(), "nodes"])
        .assert()
        .success()
        .stdout(predicates::str::contains("vega"));
}
