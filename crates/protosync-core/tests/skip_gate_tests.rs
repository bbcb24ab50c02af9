//! Sync passes inside a git repository: the modification gate and the
//! dirty-tree confirmation.

#![cfg(unix)]

use std::cell::RefCell;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use protosync_core::candidates::ACTIVE_SUFFIX;
use protosync_core::manifest::render;
use protosync_core::{
    Error, ExternalTools, NamespacePolicy, SyncMode, SyncRequest, ToolsConfig, TreeSynchronizer,
};
use protosync_git::GitSourceControl;
use protosync_test_utils::git::{commit_upstream, init_repo};
use protosync_test_utils::{ApiFixture, FakeTools};

const COMMITTED: &str = "package envoy.foo.bar;\n";
const GENERATED: &str = "package envoy.foo.bar;\n\nmessage Baz {\n}\n";

/// Fixture whose live tree was merged upstream and whose artifact differs from it.
fn committed_fixture() -> ApiFixture {
    let fixture = ApiFixture::new();
    fixture
        .write_api("envoy/foo/bar/baz.proto", COMMITTED)
        .write_api("envoy/foo/bar/BUILD", &render(false, &Vec::new()))
        .write_artifact("envoy/foo/bar", "baz.proto", ACTIVE_SUFFIX, GENERATED);
    let repo = init_repo(fixture.root());
    commit_upstream(&repo, "Merge pull request #1");
    fixture
}

fn external(tools: &FakeTools) -> ExternalTools {
    ExternalTools::new(ToolsConfig {
        printer: tools.printer.clone(),
        merger: tools.merger.clone(),
        ..ToolsConfig::default()
    })
}

fn request(fixture: &ApiFixture, mode: SyncMode) -> SyncRequest {
    SyncRequest {
        api_root: fixture.api_root(),
        labels: vec!["//envoy/foo/bar:baz.proto".to_string()],
        mode,
        ci: false,
        shadow: false,
    }
}

#[test]
fn unmodified_file_is_carried_over() {
    let fixture = committed_fixture();
    let fake = FakeTools::install(&fixture.bin_dir());
    let tools = external(&fake);
    let scm = GitSourceControl::discover(fixture.root()).unwrap().unwrap();
    let policy = NamespacePolicy::default();

    let outcome = TreeSynchronizer::new(&policy, &tools, fixture.artifact_root())
        .with_source_control(&scm)
        .run(&request(&fixture, SyncMode::Check))
        .unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.synced, 0);
    assert!(fake.invocations().is_empty());
}

#[test]
fn locally_modified_file_is_regenerated() {
    let fixture = committed_fixture();
    fixture.write_api("envoy/foo/bar/baz.proto", "package envoy.foo.bar;\n// local edit\n");
    let fake = FakeTools::install(&fixture.bin_dir());
    let tools = external(&fake);
    let scm = GitSourceControl::discover(fixture.root()).unwrap().unwrap();
    let policy = NamespacePolicy::default();

    let outcome = TreeSynchronizer::new(&policy, &tools, fixture.artifact_root())
        .with_source_control(&scm)
        .run(&request(&fixture, SyncMode::Check))
        .unwrap();

    assert_eq!(outcome.synced, 1);
    assert_eq!(fake.invocations_of("print").len(), 1);
    assert_eq!(outcome.modified, vec!["envoy/foo/bar/baz.proto"]);
}

#[test]
fn force_and_tooling_changes_regenerate_everything() {
    let fixture = committed_fixture();
    let fake = FakeTools::install(&fixture.bin_dir());
    let tools = external(&fake);
    let scm = GitSourceControl::discover(fixture.root()).unwrap().unwrap();
    let policy = NamespacePolicy::default();

    let forced = TreeSynchronizer::new(&policy, &tools, fixture.artifact_root())
        .with_source_control(&scm)
        .force(true)
        .run(&request(&fixture, SyncMode::Check))
        .unwrap();
    assert_eq!(forced.synced, 1);
    assert!(forced.diverged());

    std::fs::create_dir_all(fixture.root().join("tools")).unwrap();
    std::fs::write(fixture.root().join("tools/proto_sync.sh"), "#!/bin/sh\n").unwrap();
    let tooling: Vec<PathBuf> = vec![fixture.root().join("tools")];

    let retooled = TreeSynchronizer::new(&policy, &tools, fixture.artifact_root())
        .with_source_control(&scm)
        .with_tooling_paths(tooling)
        .run(&request(&fixture, SyncMode::Check))
        .unwrap();
    assert_eq!(retooled.synced, 1);
}

#[test]
fn dirty_tree_requires_confirmation() {
    let fixture = committed_fixture();
    fixture.write_api("envoy/foo/bar/scratch.proto", "package envoy.foo.bar;\n");
    let fake = FakeTools::install(&fixture.bin_dir());
    let tools = external(&fake);
    let scm = GitSourceControl::discover(fixture.root()).unwrap().unwrap();
    let policy = NamespacePolicy::default();

    let asked = RefCell::new(Vec::new());
    let decline = |question: &str| {
        asked.borrow_mut().push(question.to_string());
        false
    };
    let err = TreeSynchronizer::new(&policy, &tools, fixture.artifact_root())
        .with_source_control(&scm)
        .force(true)
        .with_confirm(&decline)
        .run(&request(&fixture, SyncMode::Fix))
        .unwrap_err();

    assert!(matches!(err, Error::Aborted { .. }));
    assert_eq!(fixture.read_api("envoy/foo/bar/baz.proto"), COMMITTED);
    let asked = asked.borrow();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].contains("?? api/envoy/foo/bar/scratch.proto"));
    assert!(asked[0].ends_with("Continue?"));
}

#[test]
fn dirty_tree_is_confirmed_automatically_in_ci() {
    let fixture = committed_fixture();
    fixture.write_api("envoy/foo/bar/scratch.proto", "package envoy.foo.bar;\n");
    let fake = FakeTools::install(&fixture.bin_dir());
    let tools = external(&fake);
    let scm = GitSourceControl::discover(fixture.root()).unwrap().unwrap();
    let policy = NamespacePolicy::default();
    let never = |question: &str| -> bool { panic!("CI run prompted: {question}") };
    let mut req = request(&fixture, SyncMode::Fix);
    req.ci = true;

    let outcome = TreeSynchronizer::new(&policy, &tools, fixture.artifact_root())
        .with_source_control(&scm)
        .force(true)
        .with_confirm(&never)
        .run(&req)
        .unwrap();

    assert!(outcome.applied);
    assert_eq!(fixture.read_api("envoy/foo/bar/baz.proto"), GENERATED);
    assert_eq!(outcome.deleted, vec!["envoy/foo/bar/scratch.proto"]);
    fixture.assert_api_not_exists("envoy/foo/bar/scratch.proto");
}
