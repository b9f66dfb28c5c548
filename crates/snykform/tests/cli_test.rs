//! Integration tests for the `snykform` CLI binary.
//!
//! Argument parsing, offline workflow commands against temp files, and
//! lookups against a wiremock stand-in for the Snyk API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `snykform` binary with env isolation.
///
/// Clears all `SNYK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn snykform_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("snykform");
    cmd.env("HOME", "/tmp/snykform-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/snykform-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("SNYK_PROFILE")
        .env_remove("SNYK_API_GROUP")
        .env_remove("SNYK_API_KEY")
        .env_remove("SNYK_ENDPOINT")
        .env_remove("SNYK_OUTPUT")
        .env_remove("SNYK_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const MANIFEST: &str = r#"
organizations:
  acme:
    name: acme-prod
    notifications:
      new_issues: { enabled: true, severity: high, type: vuln }
      project_imports: true
      test_limits: true
      weekly_report: false
integrations:
  acme-github:
    organization: organization.acme
    type: github
    credentials:
      token: ghp_manifest_secret
"#;

fn write_manifest(dir: &Path, body: &str) -> String {
    let file = dir.join("snykform.yaml");
    std::fs::write(&file, body).unwrap();
    file.display().to_string()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = snykform_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    snykform_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Snyk organizations")
            .and(predicate::str::contains("plan"))
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("destroy")),
    );
}

#[test]
fn test_version_flag() {
    snykform_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("snykform"));
}

#[test]
fn test_completions_zsh() {
    snykform_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_integration_types_offline() {
    snykform_cmd()
        .args(["integrations", "types", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("github-enterprise")
                .and(predicate::str::contains("docker-hub")),
        );
}

// ── Credentials ─────────────────────────────────────────────────────

#[test]
fn test_orgs_list_without_group() {
    let output = snykform_cmd().args(["orgs", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("No Snyk group"), "{text}");
}

#[test]
fn test_unknown_profile() {
    let output = snykform_cmd()
        .args(["--profile", "staging", "orgs", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("staging"));
}

// ── Offline workflow ────────────────────────────────────────────────

#[test]
fn test_validate_counts_resources() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_manifest(dir.path(), MANIFEST);
    snykform_cmd()
        .args(["validate", "-f", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 organizations, 1 integrations"));
}

#[test]
fn test_validate_rejects_dangling_reference() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_manifest(
        dir.path(),
        &MANIFEST.replace("organization.acme", "organization.missing"),
    );
    let output = snykform_cmd()
        .args(["validate", "-f", &file])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("organization.missing"));
}

#[test]
fn test_validate_rejects_unknown_integration_type() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_manifest(dir.path(), &MANIFEST.replace("type: github", "type: not-a-tool"));
    let output = snykform_cmd()
        .args(["validate", "-f", &file])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("integration.acme-github.type"));
}

#[test]
fn test_validate_rejects_unknown_section() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_manifest(dir.path(), "orgs: {}\n");
    let output = snykform_cmd()
        .args(["validate", "-f", &file])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_plan_without_refresh_needs_no_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_manifest(dir.path(), MANIFEST);
    let state = dir.path().join("state.json");
    let output = snykform_cmd()
        .args(["plan", "--no-refresh", "-f", &file, "--state"])
        .arg(&state)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("+ organization.acme"), "{stdout}");
    assert!(stdout.contains("+ integration.acme-github"), "{stdout}");
    assert!(stdout.contains("(known after apply)"), "{stdout}");
    assert!(stdout.contains("Plan: 2 to add"), "{stdout}");
    assert!(!stdout.contains("ghp_manifest_secret"), "{stdout}");
    assert!(!state.exists(), "plan must not write state");
}

#[test]
fn test_apply_requires_yes_without_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_manifest(dir.path(), MANIFEST);
    let state = dir.path().join("state.json");
    let output = snykform_cmd()
        .args([
            "--group-id",
            "g",
            "--api-key",
            "k",
            "--endpoint",
            "http://127.0.0.1:9/api/v1/",
            "apply",
            "--no-refresh",
            "-f",
            &file,
            "--state",
        ])
        .arg(&state)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
    assert!(!state.exists());
}

#[test]
fn test_show_masks_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let snapshot = json!({
        "version": 1,
        "serial": 3,
        "resources": {
            "integration.gh": {
                "id": "int-1",
                "attributes": {
                    "organization": "org-1",
                    "type": "github",
                    "credentials": [{ "token": "ghp_state_secret" }]
                }
            }
        }
    });
    std::fs::write(&state, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let output = snykform_cmd()
        .args(["show", "-o", "json", "--state"])
        .arg(&state)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("integration.gh"));
    assert!(stdout.contains("int-1"));
    assert!(!stdout.contains("ghp_state_secret"));
}

#[test]
fn test_destroy_empty_state_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    snykform_cmd()
        .args(["destroy", "--state"])
        .arg(&state)
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to destroy"));
}

#[test]
fn test_corrupt_state_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(&state, "{ not json").unwrap();
    let output = snykform_cmd()
        .args(["show", "--state"])
        .arg(&state)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("state file"));
}

// ── Lookups against a stand-in API ──────────────────────────────────

fn remote_args(server: &MockServer) -> Vec<String> {
    vec![
        "--group-id".into(),
        "group-1".into(),
        "--api-key".into(),
        "test-key".into(),
        "--endpoint".into(),
        format!("{}/api/v1/", server.uri()),
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orgs_list_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/group/group-1/orgs"))
        .and(header("authorization", "token test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "group-1",
            "name": "Test Group",
            "orgs": [
                {"id": "org-1", "name": "Platform", "slug": "platform", "url": "https://app.snyk.io/org/platform"},
                {"id": "org-2", "name": "Payments", "slug": "payments", "url": "https://app.snyk.io/org/payments"}
            ]
        })))
        .mount(&server)
        .await;

    let args = remote_args(&server);
    let output = tokio::task::spawn_blocking(move || {
        snykform_cmd()
            .args(&args)
            .args(["orgs", "list", "-o", "plain"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "org-1\norg-2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_api_key_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let args = remote_args(&server);
    let output = tokio::task::spawn_blocking(move || {
        snykform_cmd()
            .args(&args)
            .args(["integrations", "list", "--org", "org-1"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Authentication failed"));
}
