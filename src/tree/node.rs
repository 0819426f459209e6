use super::path::{NodePath, resolve};
use crate::error::Rejection;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of the root folder of every tree.
pub const ROOT_NAME: &str = "fs";

/// Kind of node, also the base name used when creating one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(NodeKind::File),
            "folder" | "dir" => Ok(NodeKind::Folder),
            other => Err(Rejection::InvalidArgument(format!(
                "'{}' is not a node kind (file, folder)",
                other
            ))),
        }
    }
}

/// A file or a folder of uniquely named children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File {
        name: String,
        content: String,
    },
    Folder {
        name: String,
        children: BTreeMap<String, Node>,
    },
}

impl Node {
    /// Empty root folder.
    pub fn root() -> Self {
        Self::folder(ROOT_NAME)
    }

    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Node::File {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Node::Folder {
            name: name.into(),
            children: BTreeMap::new(),
        }
    }

    /// Folder holding `children`; on a name clash the last one wins.
    pub fn folder_with(name: impl Into<String>, children: impl IntoIterator<Item = Node>) -> Self {
        Node::Folder {
            name: name.into(),
            children: children
                .into_iter()
                .map(|child| (child.name().to_string(), child))
                .collect(),
        }
    }

    /// Fresh node of `kind`: an empty file or an empty folder.
    pub fn empty(kind: NodeKind, name: impl Into<String>) -> Self {
        match kind {
            NodeKind::File => Self::file(name, ""),
            NodeKind::Folder => Self::folder(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File { name, .. } | Node::Folder { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File { .. } => NodeKind::File,
            Node::Folder { .. } => NodeKind::Folder,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File { content, .. } => Some(content),
            Node::Folder { .. } => None,
        }
    }

    pub fn set_content(&mut self, text: &str) -> Result<(), Rejection> {
        match self {
            Node::File { content, .. } => {
                *content = text.to_string();
                Ok(())
            }
            Node::Folder { .. } => Err(Rejection::IsFolder),
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Folder { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().and_then(|c| c.get(name))
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Copy of this node without descendants.
    pub fn shell(&self) -> Node {
        match self {
            Node::File { .. } => self.clone(),
            Node::Folder { name, .. } => Node::folder(name.clone()),
        }
    }

    /// Inserts `node` keyed by its own name.
    pub fn insert_child(&mut self, node: Node) -> Result<(), Rejection> {
        match self {
            Node::Folder { children, .. } => {
                if children.contains_key(node.name()) {
                    return Err(Rejection::AlreadyExists);
                }
                children.insert(node.name().to_string(), node);
                Ok(())
            }
            Node::File { .. } => Err(Rejection::IsFile),
        }
    }

    pub fn remove_child(&mut self, name: &str) -> Option<Node> {
        match self {
            Node::Folder { children, .. } => children.remove(name),
            Node::File { .. } => None,
        }
    }

    /// Renames child `from` to `to`, re-keying it under the new name.
    pub fn rename_child(&mut self, from: &str, to: &str) -> Result<(), Rejection> {
        if from == to {
            return if self.has_child(from) {
                Ok(())
            } else {
                Err(Rejection::NotFound)
            };
        }
        if self.has_child(to) {
            return Err(Rejection::AlreadyExists);
        }

        let mut node = self.remove_child(from).ok_or(Rejection::NotFound)?;
        match &mut node {
            Node::File { name, .. } | Node::Folder { name, .. } => *name = to.to_string(),
        }
        self.insert_child(node)
    }

    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        let visited = resolve(self, path);
        if visited.len() == path.len() {
            visited.last().copied()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let mut segments = path.segments().iter();
        if segments.next().map(String::as_str) != Some(self.name()) {
            return None;
        }

        let mut cursor = self;
        for segment in segments {
            cursor = match cursor {
                Node::Folder { children, .. } => children.get_mut(segment)?,
                Node::File { .. } => return None,
            };
        }
        Some(cursor)
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.get(path).is_some()
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn count(&self) -> usize {
        1 + self
            .children()
            .map(|c| c.values().map(Node::count).sum())
            .unwrap_or(0)
    }

    /// Pre-order walk yielding `(depth, node)`.
    pub fn walk(&self) -> Vec<(usize, &Node)> {
        fn visit<'a>(node: &'a Node, depth: usize, out: &mut Vec<(usize, &'a Node)>) {
            out.push((depth, node));
            if let Some(children) = node.children() {
                for child in children.values() {
                    visit(child, depth + 1, out);
                }
            }
        }

        let mut out = Vec::new();
        visit(self, 0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_empty_folder() {
        let root = Node::root();
        assert_eq!(root.name(), ROOT_NAME);
        assert_eq!(root.kind(), NodeKind::Folder);
        assert!(root.children().unwrap().is_empty());
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let mut root = Node::root();
        root.insert_child(Node::file("a", "")).unwrap();
        assert_eq!(
            root.insert_child(Node::folder("a")),
            Err(Rejection::AlreadyExists)
        );
    }

    #[test]
    fn test_insert_into_file_fails() {
        let mut file = Node::file("a", "");
        assert_eq!(file.insert_child(Node::file("b", "")), Err(Rejection::IsFile));
    }

    #[test]
    fn test_rename_child_rekeys() {
        let mut root = Node::root();
        root.insert_child(Node::file("old", "x")).unwrap();
        root.rename_child("old", "new").unwrap();

        assert!(!root.has_child("old"));
        let renamed = root.child("new").unwrap();
        assert_eq!(renamed.name(), "new");
        assert_eq!(renamed.content(), Some("x"));
    }

    #[test]
    fn test_rename_child_to_itself_is_noop() {
        let mut root = Node::root();
        root.insert_child(Node::file("same", "")).unwrap();
        root.rename_child("same", "same").unwrap();
        assert!(root.has_child("same"));
    }

    #[test]
    fn test_rename_child_collision() {
        let mut root = Node::root();
        root.insert_child(Node::file("a", "")).unwrap();
        root.insert_child(Node::file("b", "")).unwrap();
        assert_eq!(root.rename_child("a", "b"), Err(Rejection::AlreadyExists));
        assert!(root.has_child("a"));
    }

    #[test]
    fn test_get_mut_and_count() {
        let mut root = Node::root();
        let mut docs = Node::folder("docs");
        docs.insert_child(Node::file("notes", "")).unwrap();
        root.insert_child(docs).unwrap();

        let path: NodePath = "fs/docs/notes".parse().unwrap();
        root.get_mut(&path).unwrap().set_content("updated").unwrap();
        assert_eq!(root.get(&path).unwrap().content(), Some("updated"));
        assert_eq!(root.count(), 3);
    }

    #[test]
    fn test_shell_drops_children() {
        let mut docs = Node::folder("docs");
        docs.insert_child(Node::file("notes", "")).unwrap();
        assert!(docs.shell().children().unwrap().is_empty());
    }

    #[test]
    fn test_walk_is_preorder() {
        let mut root = Node::root();
        let mut a = Node::folder("a");
        a.insert_child(Node::file("x", "")).unwrap();
        root.insert_child(a).unwrap();
        root.insert_child(Node::file("b", "")).unwrap();

        let names: Vec<(usize, &str)> = root
            .walk()
            .into_iter()
            .map(|(d, n)| (d, n.name()))
            .collect();
        assert_eq!(names, vec![(0, "fs"), (1, "a"), (2, "x"), (1, "b")]);
    }

    #[test]
    fn test_node_kind_parse() {
        assert_eq!("file".parse::<NodeKind>().unwrap(), NodeKind::File);
        assert_eq!("folder".parse::<NodeKind>().unwrap(), NodeKind::Folder);
        assert!(matches!(
            "socket".parse::<NodeKind>(),
            Err(Rejection::InvalidArgument(_))
        ));
    }
}
