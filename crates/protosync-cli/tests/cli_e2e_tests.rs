//! Integration tests for the protosync binary.
//!
//! These tests exercise the compiled binary using assert_cmd, with fake
//! printer and merger scripts wired in through `protosync.toml`.

use assert_cmd::Command;
use predicates::prelude::*;
use protosync_test_utils::{ApiFixture, FakeTools};

const ACTIVE: &str = ".active_or_frozen.proto";
const LABEL: &str = "//envoy/foo/bar:baz.proto";
const BAZ: &str = "syntax = \"proto3\";\n\npackage envoy.foo.bar;\n";

/// Get a Command for the protosync binary
fn protosync_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("protosync"))
}

/// Fixture with one artifact, fake tools and a config file pointing at both.
fn configured_fixture() -> (ApiFixture, FakeTools) {
    let fixture = ApiFixture::new();
    fixture.write_artifact("envoy/foo/bar", "baz.proto", ACTIVE, BAZ);
    let tools = FakeTools::install(&fixture.bin_dir());
    let config = format!(
        "[tools]\nprinter = \"{}\"\nmerger = \"{}\"\n\n[artifacts]\nroot = \"out\"\n",
        tools.printer.display(),
        tools.merger.display()
    );
    std::fs::write(fixture.root().join("protosync.toml"), config).unwrap();
    (fixture, tools)
}

// ============================================================================
// Help and Argument Tests
// ============================================================================

#[test]
fn test_help_output() {
    protosync_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--api-shadow-root"));
}

#[test]
fn test_version_output() {
    protosync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("protosync"));
}

#[test]
fn test_mode_is_required() {
    protosync_cmd()
        .arg(LABEL)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mode"));
}

#[test]
fn test_missing_api_root_is_user_error() {
    let dir = tempfile::tempdir().unwrap();
    protosync_cmd()
        .current_dir(dir.path())
        .args(["--mode", "check", "--api-root", "does-not-exist"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a directory"));
}

// ============================================================================
// Sync Tests
// ============================================================================

#[cfg(unix)]
#[test]
fn test_check_empty_tree_without_labels_succeeds() {
    let (fixture, _tools) = configured_fixture();
    protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[cfg(unix)]
#[test]
fn test_check_reports_patch_and_fails() {
    let (fixture, _tools) = configured_fixture();
    protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "check", LABEL])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please apply following patch to directory"))
        .stderr(predicate::str::contains("+++ b/envoy/foo/bar/baz.proto"));

    fixture.assert_api_not_exists("envoy/foo/bar/baz.proto");
}

#[cfg(unix)]
#[test]
fn test_fix_in_ci_then_check_is_clean() {
    let (fixture, tools) = configured_fixture();

    protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "fix", "--ci", LABEL])
        .assert()
        .success();

    assert_eq!(fixture.read_api("envoy/foo/bar/baz.proto"), BAZ);
    fixture.assert_api_exists("envoy/foo/bar/BUILD");
    assert_eq!(tools.invocations_of("print").len(), 1);

    protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "check", LABEL])
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn test_fix_deletion_without_terminal_is_declined() {
    let (fixture, _tools) = configured_fixture();
    fixture.write_api("envoy/old/v3/gone.proto", "package envoy.old.v3;\n");

    protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "fix", LABEL])
        .write_stdin("y\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("envoy/old/v3/gone.proto"))
        .stderr(predicate::str::contains("Aborted"));

    fixture.assert_api_exists("envoy/old/v3/gone.proto");
    fixture.assert_api_not_exists("envoy/foo/bar/baz.proto");
}

#[cfg(unix)]
#[test]
fn test_fix_in_ci_deletes_files() {
    let (fixture, _tools) = configured_fixture();
    fixture.write_api("envoy/old/v3/gone.proto", "package envoy.old.v3;\n");

    protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "fix", "--ci", LABEL])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 deleted"));

    fixture.assert_api_not_exists("envoy/old/v3/gone.proto");
}

#[cfg(unix)]
#[test]
fn test_shadow_pass_runs_after_api_pass() {
    let (fixture, tools) = configured_fixture();
    fixture.write_artifact(
        "envoy/foo/bar",
        "baz.proto",
        ".next_major_version_candidate.envoy_internal.proto",
        BAZ,
    );
    std::fs::create_dir_all(fixture.root().join("shadow")).unwrap();

    protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "fix", "--ci", "--api-shadow-root", "shadow", LABEL])
        .assert()
        .success();

    fixture.assert_api_exists("envoy/foo/bar/baz.proto");
    let shadow = std::fs::read_to_string(fixture.root().join("shadow/envoy/foo/bar/baz.proto")).unwrap();
    assert!(shadow.ends_with("// merged\n"));
    assert_eq!(tools.invocations_of("merge").len(), 1);
}

#[cfg(unix)]
#[test]
fn test_json_outcome() {
    let (fixture, _tools) = configured_fixture();

    let output = protosync_cmd()
        .current_dir(fixture.root())
        .args(["--mode", "check", "--json", LABEL])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let outcomes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcomes[0]["mode"], "check");
    assert_eq!(outcomes[0]["applied"], false);
    assert_eq!(outcomes[0]["added"][1], "envoy/foo/bar/baz.proto");
}

#[cfg(unix)]
#[test]
fn test_namespace_violation_exits_with_error() {
    let (fixture, _tools) = configured_fixture();
    fixture.write_artifact(
        "contrib/envoy/extensions/filters/http/custom/v3",
        "custom.proto",
        ACTIVE,
        "package envoy.extensions.filters.http.custom.v3;\n",
    );

    protosync_cmd()
        .current_dir(fixture.root())
        .args([
            "--mode",
            "fix",
            "--ci",
            "//contrib/envoy/extensions/filters/http/custom/v3:custom.proto",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not use an unstable version namespace"));
}
