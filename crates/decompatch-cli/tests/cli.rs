#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! Exit-code behaviour of the `decompatch` binary.

use std::path::Path;
use std::process::{Command, Output};

fn decompatch(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_decompatch"))
        .args(args)
        .current_dir(cwd)
        .env_remove("DECOMPATCH_CONFIG")
        .env("DECOMPATCH_ROOT", cwd)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn missing_action_prints_usage_and_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = decompatch(dir.path(), &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
    assert!(is_empty_dir(dir.path()));
}

#[test]
fn unknown_action_exits_1_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    for action in ["bogus", "make-feature-patches", "apply"] {
        let out = decompatch(dir.path(), &[action]);
        assert_eq!(out.status.code(), Some(1), "action {action}");
    }
    assert!(is_empty_dir(dir.path()));
}

#[test]
fn help_exits_0() {
    let dir = tempfile::tempdir().unwrap();
    let out = decompatch(dir.path(), &["--help"]);
    assert_eq!(out.status.code(), Some(0));
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("makeFeaturePatches"));
    assert!(text.contains("applyPatches"));
    assert!(text.contains("setup"));
}

#[test]
fn apply_patches_without_project_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = decompatch(dir.path(), &["applyPatches"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("project").exists());
}

#[test]
fn make_feature_patches_without_project_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let out = decompatch(dir.path(), &["makeFeaturePatches"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn malformed_config_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("decompatch.toml"), "[project]\nlayout = \"gradle\"\n").unwrap();
    let out = decompatch(dir.path(), &["applyPatches"]);
    assert_eq!(out.status.code(), Some(1));
}

/// Plain-layout workspace whose downloader and decompiler are shell stand-ins.
#[cfg(unix)]
const WORKSPACE_CONFIG: &str = r#"
[artifact.source]
command = ["sh", "-c", "printf 'PK' > \"$1\"", "fetch", "{output}"]

[decompiler]
command = ["sh", "-c", '''mkdir -p "$2/com/game" && printf 'package com.game;\n\npublic class Server {\n    int port = 25565;\n}\n' > "$2/com/game/Server.java"''', "decompile", "{input}", "{output}"]

[project]
layout = "plain"

[git]
user_name = "Patch Tester"
user_email = "tester@example.com"
"#;

#[cfg(unix)]
fn seeded_workspace() -> (tempfile::TempDir, decompatch_core::Repository) {
    use decompatch_core::config::GitConfig;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("decompatch.toml"), WORKSPACE_CONFIG).unwrap();
    let out = decompatch(dir.path(), &["setup"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));

    let git = GitConfig {
        user_name: Some("Patch Tester".into()),
        user_email: Some("tester@example.com".into()),
        ..GitConfig::default()
    };
    let repo = decompatch_core::Repository::open(dir.path().join("project"), &git).unwrap();
    (dir, repo)
}

#[cfg(unix)]
fn commit_port(repo: &decompatch_core::Repository, port: &str, message: &str) {
    let path = repo.path().join("src/com/game/Server.java");
    let content = std::fs::read_to_string(&path).unwrap().replace("25565", port);
    std::fs::write(&path, content).unwrap();
    repo.add_all().unwrap();
    repo.commit(message).unwrap();
}

#[cfg(unix)]
#[test]
fn second_setup_exits_1_and_keeps_project() {
    let (dir, repo) = seeded_workspace();
    let head = repo.execute(["rev-parse", "HEAD"]).unwrap();
    std::fs::write(repo.path().join("notes.txt"), "local work").unwrap();

    let out = decompatch(dir.path(), &["setup"]);
    assert_eq!(out.status.code(), Some(1));

    assert_eq!(repo.execute(["rev-parse", "HEAD"]).unwrap(), head);
    assert_eq!(
        std::fs::read_to_string(repo.path().join("notes.txt")).unwrap(),
        "local work"
    );
    assert!(dir.path().join("work/decompiled/com/game/Server.java").is_file());
}

#[cfg(unix)]
#[test]
fn conflicting_patch_exits_1() {
    let (dir, repo) = seeded_workspace();
    commit_port(&repo, "25566", "Raise default port");

    let out = decompatch(dir.path(), &["makeFeaturePatches"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    let stored = decompatch_core::PatchSeries::load(dir.path().join("patches")).unwrap();
    assert_eq!(stored.len(), 1);

    repo.execute(["reset", "--hard", "baseline"]).unwrap();
    commit_port(&repo, "30000", "Upstream port change");

    let out = decompatch(dir.path(), &["applyPatches"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(repo.am_in_progress().unwrap());
}

#[cfg(unix)]
#[test]
fn clean_apply_exits_0() {
    let (dir, repo) = seeded_workspace();
    commit_port(&repo, "25566", "Raise default port");
    assert_eq!(decompatch(dir.path(), &["makeFeaturePatches"]).status.code(), Some(0));

    repo.execute(["reset", "--hard", "baseline"]).unwrap();
    let out = decompatch(dir.path(), &["applyPatches"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(
        std::fs::read_to_string(repo.path().join("src/com/game/Server.java"))
            .unwrap()
            .contains("25566")
    );
}
