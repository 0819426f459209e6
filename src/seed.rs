//! Initial content for the stable tree.
//!
//! Either a small built-in snapshot or a real directory imported node by
//! node. Directory imports honor `.gitignore` and skip hidden entries.

use crate::error::{JournalError, Result};
use crate::tree::{Node, NodePath, ROOT_NAME};
use crate::validation::validate_node_name;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Component, Path};

/// Built-in stable tree used when no seed directory is given.
pub fn demo() -> Node {
    Node::folder_with(
        ROOT_NAME,
        [
            Node::file("readme", ""),
            Node::folder_with(
                "docs",
                [
                    Node::file("notes", "meeting at noon"),
                    Node::file("todo", "- buy milk"),
                ],
            ),
            Node::folder_with("src", [Node::file("main", "print('hello')")]),
        ],
    )
}

/// Builds a stable tree mirroring `dir`.
///
/// File contents are read as UTF-8 (lossily). Entries whose names are not
/// valid node names, symlinks and other special files are skipped.
pub fn from_dir(dir: &Path) -> Result<Node> {
    if !dir.is_dir() {
        return Err(JournalError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Seed directory not found: {}", dir.display()),
        )));
    }

    let mut root = Node::root();
    let mut imported = 0usize;

    for result in WalkBuilder::new(dir).require_git(false).build() {
        let entry = result?;
        let Some(relative) = pathdiff::diff_paths(entry.path(), dir) else {
            continue;
        };

        let mut segments = Vec::new();
        for component in relative.components() {
            if let Component::Normal(name) = component {
                segments.push(name.to_string_lossy().into_owned());
            }
        }
        let Some(name) = segments.last().cloned() else {
            // The seed root itself.
            continue;
        };

        if let Err(why) = validate_node_name(&name) {
            log::warn!("Skipping {}: {}", entry.path().display(), why);
            continue;
        }

        let path = NodePath::from_segments(
            std::iter::once(ROOT_NAME.to_string()).chain(segments),
        );
        let Some(parent) = path.parent().and_then(|p| root.get_mut(&p)) else {
            log::debug!("Parent of {} was skipped; skipping it too", path);
            continue;
        };

        let node = match entry.file_type() {
            Some(ft) if ft.is_dir() => Node::folder(name),
            Some(ft) if ft.is_file() => {
                let bytes = fs::read(entry.path())?;
                Node::file(name, String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => {
                log::debug!("Skipping special file {}", entry.path().display());
                continue;
            }
        };

        if parent.insert_child(node).is_ok() {
            imported += 1;
        }
    }

    log::info!("Seeded {} nodes from {}", imported, dir.display());
    Ok(root)
}
