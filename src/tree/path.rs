//! Paths into a namespace tree.

use super::node::{Node, ROOT_NAME};
use crate::error::Rejection;
use std::fmt;
use std::str::FromStr;

/// Ordered names from the root to a target node, root included.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<String>);

impl NodePath {
    /// Path of the root folder (`fs`).
    pub fn root() -> Self {
        Self(vec![ROOT_NAME.to_string()])
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` only for the `fs` root itself.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1 && self.0[0] == ROOT_NAME
    }

    /// Last segment.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// `None` for single-segment paths, root or not.
    pub fn parent(&self) -> Option<NodePath> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn join(&self, name: &str) -> NodePath {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// Same parent, different last segment.
    pub fn with_name(&self, name: &str) -> NodePath {
        match self.parent() {
            Some(parent) => parent.join(name),
            None => Self(vec![name.to_string()]),
        }
    }

    /// Every prefix from the root down to (and including) `self`.
    pub fn prefixes(&self) -> impl Iterator<Item = NodePath> + '_ {
        (1..=self.0.len()).map(|end| Self(self.0[..end].to_vec()))
    }

    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl FromStr for NodePath {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s
            .split('/')
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(Rejection::InvalidPath(s.to_string()));
        }

        Ok(Self(segments))
    }
}

/// Walks `path` down from `tree`, returning every node visited.
///
/// The result is shorter than `path` when a segment is missing; a path that
/// does not start at the root name resolves to nothing.
pub fn resolve<'a>(tree: &'a Node, path: &NodePath) -> Vec<&'a Node> {
    let mut visited = Vec::with_capacity(path.len());

    let mut segments = path.segments().iter();
    match segments.next() {
        Some(first) if first == tree.name() => visited.push(tree),
        _ => return visited,
    }

    let mut cursor = tree;
    for segment in segments {
        match cursor.child(segment) {
            Some(next) => {
                visited.push(next);
                cursor = next;
            }
            None => break,
        }
    }

    visited
}
