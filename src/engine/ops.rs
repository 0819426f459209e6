//! Transaction-visible operations against the working tree.
//!
//! Every mutation follows the same shape: validate against the working tree
//! with the stable tree showing through, check the transaction can see the
//! target, journal the intent, then re-read the path so the working tree
//! picks the new entry up through redo. Nothing is loaded into the working
//! tree until every check has passed. In replay mode the journal step is
//! skipped and the working tree is mutated directly.

use super::recovery::{apply, redo};
use super::{Database, Mode, Publisher};
use crate::error::{Rejection, Result};
use crate::journal::Operation;
use crate::narrative::Severity;
use crate::registry::TxnId;
use crate::tree::{Node, NodeKind, NodePath};
use crate::validation::validate_node_name;

impl<P: Publisher> Database<P> {
    /// Begins a new transaction.
    pub fn start(&mut self) -> TxnId {
        let txn = self.registry.begin();
        self.narrative
            .record(Severity::Success, Some(txn), "start transaction", None, None);
        self.journal.append(txn, Operation::Start);
        self.publish();
        txn
    }

    /// Brings `path` into the working tree for `txn`.
    pub fn read(&mut self, txn: impl Into<Option<TxnId>>, path: &NodePath) -> Result<()> {
        let txn = txn.into();
        let result = self.selected(txn).and_then(|t| {
            self.narrative
                .record(Severity::Info, Some(t), "reading path", Some(path), None);
            self.read_in(Mode::Logged(t), path)
        });
        self.finish(txn, Some(path), result)
    }

    /// Replaces the content of the file at `path`.
    pub fn write(
        &mut self,
        txn: impl Into<Option<TxnId>>,
        path: &NodePath,
        text: &str,
    ) -> Result<()> {
        let txn = txn.into();
        let result = self
            .selected(txn)
            .and_then(|t| self.write_in(Mode::Logged(t), path, text));
        self.finish(txn, Some(path), result)
    }

    /// Creates a node of `kind` inside the folder at `path`.
    ///
    /// Returns the chosen name: `kind`, or `kind N` if that is taken.
    pub fn create(
        &mut self,
        txn: impl Into<Option<TxnId>>,
        path: &NodePath,
        kind: NodeKind,
    ) -> Result<String> {
        let txn = txn.into();
        let result = self
            .selected(txn)
            .and_then(|t| self.create_in(Mode::Logged(t), path, kind));
        self.finish(txn, Some(path), result)
    }

    /// Deletes the node at `path`, descendants first.
    pub fn delete(&mut self, txn: impl Into<Option<TxnId>>, path: &NodePath) -> Result<()> {
        let txn = txn.into();
        let result = self
            .selected(txn)
            .and_then(|t| self.delete_in(Mode::Logged(t), path));
        self.finish(txn, Some(path), result)
    }

    /// Renames the node at `path` to `name`.
    pub fn rename(
        &mut self,
        txn: impl Into<Option<TxnId>>,
        path: &NodePath,
        name: &str,
    ) -> Result<()> {
        let txn = txn.into();
        let result = self
            .selected(txn)
            .and_then(|t| self.rename_in(Mode::Logged(t), path, name));
        self.finish(txn, Some(path), result)
    }

    pub(super) fn read_in(&mut self, mode: Mode, path: &NodePath) -> Result<()> {
        self.working.materialize(&self.stable, path);

        let Mode::Logged(txn) = mode else {
            return Ok(());
        };
        let pending = self
            .journal
            .latest_for(txn, path)
            .filter(|entry| !self.working.is_applied(entry.lsn))
            .cloned();

        if let Some(entry) = pending {
            redo(self.working.root_mut(), &entry, "working")?;
            self.working.mark_applied(entry.lsn);
        }
        Ok(())
    }

    pub(super) fn write_in(&mut self, mode: Mode, path: &NodePath, text: &str) -> Result<()> {
        let node = self
            .working
            .view(&self.stable, path)
            .ok_or(Rejection::NotFound)?;
        let before = match node.content() {
            None => return Err(Rejection::IsFolder.into()),
            Some(content) if content == text => return Err(Rejection::Unchanged.into()),
            Some(content) => content.to_string(),
        };

        let op = Operation::Write {
            path: path.clone(),
            before,
            after: text.to_string(),
        };
        self.admit(mode, std::slice::from_ref(&op))?;

        self.narrate(mode, "writing path", path, Some(text));
        self.working.materialize(&self.stable, path);

        match mode {
            Mode::Logged(txn) => {
                self.journal.append(txn, op);
                // The working copy may lag the journal; go through redo.
                self.read_in(mode, path)
            }
            Mode::Replay => {
                if let Some(node) = self.working.get_mut(path) {
                    node.set_content(text)?;
                }
                Ok(())
            }
        }
    }

    pub(super) fn create_in(
        &mut self,
        mode: Mode,
        path: &NodePath,
        kind: NodeKind,
    ) -> Result<String> {
        let node = self
            .working
            .view(&self.stable, path)
            .ok_or(Rejection::NotFound)?;
        if node.is_file() {
            return Err(Rejection::IsFile.into());
        }

        let on_disk = match mode {
            Mode::Logged(_) => self.stable.get(path),
            Mode::Replay => None,
        };
        let taken = |candidate: &str| {
            node.has_child(candidate) || on_disk.is_some_and(|d| d.has_child(candidate))
        };

        let mut name = kind.to_string();
        let mut suffix = 1;
        while taken(&name) {
            name = format!("{} {}", kind, suffix);
            suffix += 1;
        }

        let op = Operation::Create {
            parent: path.clone(),
            kind,
            name: name.clone(),
        };
        self.admit(mode, std::slice::from_ref(&op))?;

        self.narrate(mode, &format!("creating path {}", kind), path, Some(&name));
        self.working.materialize(&self.stable, path);

        match mode {
            Mode::Logged(txn) => {
                self.journal.append(txn, op);
                self.read_in(mode, path)?;
            }
            Mode::Replay => {
                if let Some(parent) = self.working.get_mut(path) {
                    parent.insert_child(Node::empty(kind, name.clone()))?;
                }
            }
        }
        Ok(name)
    }

    pub(super) fn delete_in(&mut self, mode: Mode, path: &NodePath) -> Result<()> {
        if path.is_root() {
            return Err(Rejection::DeleteRoot.into());
        }
        if self.working.view(&self.stable, path).is_none() {
            return Err(Rejection::NotFound.into());
        }
        let parent = path.parent().ok_or(Rejection::NotFound)?;

        let Mode::Logged(txn) = mode else {
            self.narrate(mode, "deleting path", path, None);
            if let (Some(parent), Some(name)) = (self.working.get_mut(&parent), path.name()) {
                parent.remove_child(name);
            }
            return Ok(());
        };

        // Descendants are loaded on a copy so a refused delete loads nothing.
        let mut staged = self.working.clone();
        staged.materialize_subtree(&self.stable, path);
        let mut deletes = Vec::new();
        if let Some(node) = staged.get(path) {
            post_order_deletes(node, path, &mut deletes);
        }
        self.admit(mode, &deletes)?;

        self.narrate(mode, "deleting path", path, None);
        self.working = staged;
        for op in deletes {
            let target = op.path().cloned().unwrap_or_else(|| path.clone());
            self.journal.append(txn, op);
            self.read_in(mode, &target)?;
        }
        Ok(())
    }

    pub(super) fn rename_in(&mut self, mode: Mode, path: &NodePath, name: &str) -> Result<()> {
        validate_node_name(name)?;
        if path.is_root() {
            return Err(Rejection::RenameRoot.into());
        }
        if self.working.view(&self.stable, path).is_none() {
            return Err(Rejection::NotFound.into());
        }
        let (Some(parent), Some(old)) = (path.parent(), path.name()) else {
            return Err(Rejection::NotFound.into());
        };

        let collides = match mode {
            Mode::Logged(_) => {
                self.working.get(&parent).is_some_and(|p| p.has_child(name))
                    || self.stable.get(&parent).is_some_and(|p| p.has_child(name))
            }
            Mode::Replay => {
                name != old && self.working.get(&parent).is_some_and(|p| p.has_child(name))
            }
        };
        if collides {
            return Err(Rejection::AlreadyExists.into());
        }

        let op = Operation::Rename {
            path: path.clone(),
            from: old.to_string(),
            to: name.to_string(),
        };
        self.admit(mode, std::slice::from_ref(&op))?;

        self.narrate(mode, "renaming path", path, Some(name));

        match mode {
            Mode::Logged(txn) => {
                self.working.materialize_subtree(&self.stable, path);
                self.journal.append(txn, op);
                self.read_in(mode, path)
            }
            Mode::Replay => {
                if let Some(parent) = self.working.get_mut(&parent) {
                    parent.rename_child(old, name)?;
                }
                Ok(())
            }
        }
    }

    /// Refuses `ops` unless they apply to what the transaction can see: the
    /// stable tree plus its own journaled effects. Nodes created by other
    /// uncommitted transactions are not visible. Replay is always admitted.
    fn admit(&self, mode: Mode, ops: &[Operation]) -> Result<()> {
        let Mode::Logged(txn) = mode else {
            return Ok(());
        };

        let mut visible = self.stable.clone();
        for entry in self.journal.entries_for(txn) {
            if apply(&mut visible, &entry.op).is_err() {
                return Err(Rejection::Conflict.into());
            }
        }
        for op in ops {
            if let Err(missing) = apply(&mut visible, op) {
                log::debug!("{} cannot see '{}'", txn, missing);
                return Err(Rejection::NotFound.into());
            }
        }
        Ok(())
    }

    fn narrate(&mut self, mode: Mode, description: &str, path: &NodePath, data: Option<&str>) {
        let (txn, description) = match mode {
            Mode::Logged(txn) => (Some(txn), description.to_string()),
            Mode::Replay => (None, format!("recovery: {}", description)),
        };
        self.narrative
            .record(Severity::Info, txn, description, Some(path), data);
    }
}

/// Pushes a delete for every descendant of `node` before `node` itself.
fn post_order_deletes(node: &Node, path: &NodePath, out: &mut Vec<Operation>) {
    if let Some(children) = node.children() {
        for (name, child) in children {
            post_order_deletes(child, &path.join(name), out);
        }
    }
    out.push(Operation::Delete {
        path: path.clone(),
        kind: node.kind(),
        content: node.content().map(str::to_string),
    });
}
