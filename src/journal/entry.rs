use crate::registry::TxnId;
use crate::tree::{NodeKind, NodePath};
use std::fmt;
use std::time::SystemTime;

/// Log sequence number of a journal entry.
pub type Lsn = u64;

/// Operation kinds as they appear in the journal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Start,
    Commit,
    Abort,
    Write,
    CreateFile,
    CreateFolder,
    Delete,
    Rename,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Start => "start",
            OperationKind::Commit => "commit",
            OperationKind::Abort => "abort",
            OperationKind::Write => "write",
            OperationKind::CreateFile => "file",
            OperationKind::CreateFolder => "folder",
            OperationKind::Delete => "delete",
            OperationKind::Rename => "rename",
        };
        f.write_str(s)
    }
}

/// A recorded intent, with enough data to redo and undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Start,
    Commit,
    Abort,
    /// `before` is the working content the write replaced.
    Write {
        path: NodePath,
        before: String,
        after: String,
    },
    /// Child `name` of `kind` created under folder `parent`.
    Create {
        parent: NodePath,
        kind: NodeKind,
        name: String,
    },
    /// Removal of the node at `path`; files keep their last content.
    Delete {
        path: NodePath,
        kind: NodeKind,
        content: Option<String>,
    },
    /// Node at `path` (old name `from`) renamed to `to`.
    Rename {
        path: NodePath,
        from: String,
        to: String,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Start => OperationKind::Start,
            Operation::Commit => OperationKind::Commit,
            Operation::Abort => OperationKind::Abort,
            Operation::Write { .. } => OperationKind::Write,
            Operation::Create {
                kind: NodeKind::File,
                ..
            } => OperationKind::CreateFile,
            Operation::Create {
                kind: NodeKind::Folder,
                ..
            } => OperationKind::CreateFolder,
            Operation::Delete { .. } => OperationKind::Delete,
            Operation::Rename { .. } => OperationKind::Rename,
        }
    }

    /// Target path; lifecycle entries have none.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            Operation::Start | Operation::Commit | Operation::Abort => None,
            Operation::Write { path, .. }
            | Operation::Delete { path, .. }
            | Operation::Rename { path, .. } => Some(path),
            Operation::Create { parent, .. } => Some(parent),
        }
    }

    /// Before-value column of the journal table.
    pub fn before(&self) -> Option<String> {
        match self {
            Operation::Write { before, .. } => Some(before.clone()),
            Operation::Delete { path, kind, .. } => {
                Some(format!("{}/{}", kind, path.name().unwrap_or_default()))
            }
            Operation::Rename { from, .. } => Some(from.clone()),
            _ => None,
        }
    }

    /// After-value column of the journal table.
    pub fn after(&self) -> Option<String> {
        match self {
            Operation::Write { after, .. } => Some(after.clone()),
            Operation::Create { name, .. } => Some(name.clone()),
            Operation::Rename { to, .. } => Some(to.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub lsn: Lsn,
    pub txn: TxnId,
    pub timestamp: SystemTime,
    pub op: Operation,
}

impl JournalEntry {
    pub fn kind(&self) -> OperationKind {
        self.op.kind()
    }

    pub fn path(&self) -> Option<&NodePath> {
        self.op.path()
    }

    /// `true` if this entry targets exactly `path` for `txn`.
    pub fn touches(&self, txn: TxnId, path: &NodePath) -> bool {
        self.txn == txn && self.path() == Some(path)
    }
}
