//! Shared helpers for redo-fs integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use redo_fs::engine::{Database, RecordingPublisher};
use redo_fs::tree::{Node, NodePath};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(unused)]
pub fn path(s: &str) -> NodePath {
    s.parse().unwrap()
}

/// Stable tree shared by most tests.
///
/// ```text
/// fs/
///   readme ""
///   docs/
///     notes "meeting at noon"
///     todo  "- buy milk"
///   src/
///     main  "print('hello')"
/// ```
#[allow(unused)]
pub fn disk() -> Node {
    redo_fs::seed::demo()
}

#[allow(unused)]
pub fn database() -> Database<RecordingPublisher> {
    Database::new(disk(), RecordingPublisher::default())
}

/// Content of the file at `p` in `tree`, if any.
#[allow(unused)]
pub fn content<'a>(tree: &'a Node, p: &str) -> Option<&'a str> {
    tree.get(&path(p)).and_then(Node::content)
}

#[allow(unused)]
pub fn child_names(tree: &Node, p: &str) -> Vec<String> {
    tree.get(&path(p))
        .and_then(Node::children)
        .map(|c| c.keys().cloned().collect())
        .unwrap_or_default()
}

/// Writes `script` into a fresh temp dir and returns both.
#[allow(unused)]
pub fn write_script(script: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("scenario.txt");
    fs::write(&file, script).unwrap();
    (temp, file)
}

/// Runs `redo-fs run` on `script` with colors disabled.
#[allow(unused)]
pub fn run_script(script: &str, extra_args: &[&str]) -> assert_cmd::assert::Assert {
    let (_temp, file) = write_script(script);
    let mut cmd = cargo_bin_cmd!("redo-fs");
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .args(extra_args)
        .arg("run")
        .arg(&file);

    cmd.assert()
}
