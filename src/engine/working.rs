//! The volatile working tree and its lazy synchronization with the stable
//! tree.
//!
//! Nodes are copied over from the stable tree on first access. Once a path
//! has been copied it is never copied again, so a node an uncommitted
//! transaction deleted or renamed away stays gone for later reads.

use crate::journal::Lsn;
use crate::tree::{Node, NodePath};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: Node,
    loaded: HashSet<NodePath>,
    applied: HashSet<Lsn>,
}

impl Default for WorkingTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingTree {
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            loaded: HashSet::new(),
            applied: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        self.root.get(path)
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        self.root.get_mut(path)
    }

    /// Back to an empty root, forgetting what was loaded and applied.
    pub fn reset(&mut self) {
        log::debug!("Working tree cleared");
        *self = Self::new();
    }

    pub fn is_applied(&self, lsn: Lsn) -> bool {
        self.applied.contains(&lsn)
    }

    pub fn mark_applied(&mut self, lsn: Lsn) {
        self.applied.insert(lsn);
    }

    pub fn was_loaded(&self, path: &NodePath) -> bool {
        self.loaded.contains(path)
    }

    /// The node `path` would materialize to, without loading anything.
    ///
    /// Working nodes win; otherwise the stable node, unless some prefix was
    /// loaded earlier and has since been removed.
    pub fn view<'a>(&'a self, stable: &'a Node, path: &NodePath) -> Option<&'a Node> {
        if let Some(node) = self.root.get(path) {
            return Some(node);
        }
        for prefix in path.prefixes().skip(1) {
            if self.root.contains(&prefix) {
                continue;
            }
            if self.loaded.contains(&prefix) {
                return None;
            }
            let parent = prefix.parent().and_then(|p| self.root.get(&p));
            if parent.is_some_and(Node::is_file) {
                return None;
            }
        }
        stable.get(path)
    }

    /// Copies every node along `path` that the working tree lacks from
    /// `stable`, folders as empty shells.
    ///
    /// All or nothing: if `path` does not resolve through [`view`](Self::view)
    /// the working tree is left untouched and `false` is returned.
    pub fn materialize(&mut self, stable: &Node, path: &NodePath) -> bool {
        if self.view(stable, path).is_none() {
            return false;
        }

        for prefix in path.prefixes().skip(1) {
            if self.root.contains(&prefix) {
                continue;
            }
            if self.loaded.contains(&prefix) {
                // Removed after it was loaded; the stable copy is stale.
                return false;
            }

            let Some(source) = stable.get(&prefix) else {
                return false;
            };
            let Some(parent) = prefix.parent().and_then(|p| self.root.get_mut(&p)) else {
                return false;
            };
            if parent.insert_child(source.shell()).is_err() {
                return false;
            }

            log::debug!("Loaded {} into working tree", prefix);
            self.loaded.insert(prefix);
        }

        self.root.contains(path)
    }

    /// Like [`materialize`](Self::materialize), then loads every stable
    /// descendant of `path` that has not been removed from the working tree.
    pub fn materialize_subtree(&mut self, stable: &Node, path: &NodePath) -> bool {
        if !self.materialize(stable, path) {
            return false;
        }

        let names: Vec<String> = stable
            .get(path)
            .and_then(Node::children)
            .map(|children| children.keys().cloned().collect())
            .unwrap_or_default();

        for name in names {
            let child = path.join(&name);
            if self.root.contains(&child) || !self.loaded.contains(&child) {
                self.materialize_subtree(stable, &child);
            }
        }

        true
    }
}
